//! Dataset adapter and row sources for the composition engine
//!
//! Rows arrive as loosely typed records (CSV cells, JSON objects, GeoJSON
//! features) and leave as a validated, columnar [`Dataset`] whose every field
//! satisfies the declared type contract.

pub mod cache;
pub mod config;
pub mod dataset;
pub mod schema;
pub mod sources;

use dv_core::ComposeError;
use indexmap::IndexMap;
use thiserror::Error;

// Re-exports
pub use cache::DomainCache;
pub use config::NullConfig;
pub use dataset::{Column, Dataset, DatasetId, Domain};
pub use schema::{validate, validate_with, FieldSpec, Schema};
pub use sources::{load_dataset, CsvSource, JsonSource, RecordSource};

/// One loosely typed input row, keyed by field name
pub type RawRecord = IndexMap<String, serde_json::Value>;

/// Errors that can occur while reading rows into a dataset
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported document: {0}")]
    Format(String),

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}
