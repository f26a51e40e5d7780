//! Field typing shared by the data and view layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared storage type of a dataset field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Text,
    Instant,
    Real,
    Integer,
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Text => "Text",
            ValueType::Instant => "Instant",
            ValueType::Real => "Real",
            ValueType::Integer => "Integer",
            ValueType::Boolean => "Boolean",
        };
        f.write_str(name)
    }
}

/// Semantic type of a field as seen by an encoding channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Quantitative,
    Temporal,
    Nominal,
}

impl SemanticType {
    /// Infer the semantic type from a field's name and declared storage type.
    ///
    /// A field called `time` is always temporal, whatever it is stored as.
    pub fn infer(name: &str, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Instant => SemanticType::Temporal,
            _ if name == "time" => SemanticType::Temporal,
            ValueType::Boolean | ValueType::Text => SemanticType::Nominal,
            ValueType::Real | ValueType::Integer => SemanticType::Quantitative,
        }
    }

    /// Whether values of this type live on a continuous (min, max) domain
    pub fn is_continuous(self) -> bool {
        !matches!(self, SemanticType::Nominal)
    }
}

/// Visual channel a field can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    X,
    Y,
    Longitude,
    Latitude,
    Size,
    Color,
    Opacity,
}

impl Channel {
    /// Vega-Lite encoding key for this channel
    pub fn key(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Longitude => "longitude",
            Channel::Latitude => "latitude",
            Channel::Size => "size",
            Channel::Color => "color",
            Channel::Opacity => "opacity",
        }
    }

    /// Channels whose output is an interpolated numeric range
    pub fn needs_continuous_domain(self) -> bool {
        matches!(self, Channel::Size | Channel::Opacity)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lookup of field types, implemented by anything that owns a typed schema.
///
/// Configuration checks run against this instead of a concrete dataset so the
/// core crate stays independent of how rows are stored.
pub trait FieldCatalog {
    /// Declared type of `name`, or `None` when the field is absent
    fn value_type(&self, name: &str) -> Option<ValueType>;

    /// Semantic type of `name`, or `None` when the field is absent
    fn semantic_type(&self, name: &str) -> Option<SemanticType> {
        self.value_type(name)
            .map(|value_type| SemanticType::infer(name, value_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_inference() {
        assert_eq!(SemanticType::infer("time", ValueType::Instant), SemanticType::Temporal);
        assert_eq!(SemanticType::infer("time", ValueType::Integer), SemanticType::Temporal);
        assert_eq!(SemanticType::infer("updated", ValueType::Instant), SemanticType::Temporal);
        assert_eq!(SemanticType::infer("place", ValueType::Text), SemanticType::Nominal);
        assert_eq!(SemanticType::infer("tsunami", ValueType::Boolean), SemanticType::Nominal);
        assert_eq!(SemanticType::infer("sig", ValueType::Integer), SemanticType::Quantitative);
        assert_eq!(SemanticType::infer("mag", ValueType::Real), SemanticType::Quantitative);
    }

    #[test]
    fn test_channel_serialization() {
        let json = serde_json::to_string(&Channel::Opacity).unwrap();
        assert_eq!(json, "\"opacity\"");
        assert_eq!(Channel::Longitude.key(), "longitude");
    }
}
