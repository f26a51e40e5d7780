//! Composition error taxonomy

use thiserror::Error;

use crate::field::{Channel, ValueType};

/// Errors that abort a composition call.
///
/// All of these are raised before any view is built, so a caller never sees
/// a partially constructed document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("dataset contains no rows")]
    EmptyDataset,

    #[error("row {row}: field '{field}' is missing or does not coerce to {expected_type}")]
    Schema {
        field: String,
        expected_type: ValueType,
        row: usize,
    },

    #[error("row {row}: field '{field}' value {value} is outside its bounds")]
    OutOfBounds {
        field: String,
        value: f64,
        row: usize,
    },

    #[error("row {row}: key field '{field}' repeats value '{value}'")]
    DuplicateKey {
        field: String,
        value: String,
        row: usize,
    },

    #[error("configuration references unknown field '{field}'")]
    UnknownField { field: String },

    #[error("invalid range for parameter '{parameter}'")]
    InvalidRange { parameter: String },

    #[error("selection name '{name}' is already registered")]
    DuplicateSelectionName { name: String },

    #[error("field '{field}' cannot drive the {channel} channel")]
    IncompatibleField { field: String, channel: Channel },
}

impl ComposeError {
    pub fn unknown_field(field: impl Into<String>) -> Self {
        ComposeError::UnknownField { field: field.into() }
    }

    pub fn invalid_range(parameter: impl Into<String>) -> Self {
        ComposeError::InvalidRange {
            parameter: parameter.into(),
        }
    }
}

/// Result alias used throughout the composition pipeline
pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
