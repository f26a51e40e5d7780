//! Field-type contract and row validation
//!
//! Validation is all-or-nothing: the first row that breaks the contract
//! fails the whole call, and nothing is returned for the rows before it.

mod coerce;

use ahash::AHashSet;
use dv_core::{ComposeError, SemanticType, ValueType};
use serde::{Deserialize, Serialize};

use crate::config::NullConfig;
use crate::dataset::{Column, Dataset};
use crate::RawRecord;

/// Declared contract for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub value_type: ValueType,

    /// Inclusive bounds for numeric fields
    #[serde(default)]
    pub bounds: Option<(f64, f64)>,

    /// Larger values are drawn lower on screen when this field is an axis
    #[serde(default)]
    pub reverse_axis: bool,

    /// No two rows may share a value
    #[serde(default)]
    pub unique: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            bounds: None,
            reverse_axis: false,
            unique: false,
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse_axis = true;
        self
    }

    pub fn key(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn semantic_type(&self) -> SemanticType {
        SemanticType::infer(&self.name, self.value_type)
    }
}

/// Ordered set of required fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Contract for seismic event rows
    pub fn earthquake() -> Self {
        Self::new(vec![
            FieldSpec::new("id", ValueType::Text).key(),
            FieldSpec::new("time", ValueType::Instant),
            FieldSpec::new("lat", ValueType::Real).with_bounds(-90.0, 90.0),
            FieldSpec::new("lon", ValueType::Real).with_bounds(-180.0, 180.0),
            FieldSpec::new("depth", ValueType::Real).reversed(),
            FieldSpec::new("mag", ValueType::Real),
            FieldSpec::new("sig", ValueType::Integer),
            FieldSpec::new("tsunami", ValueType::Boolean),
            FieldSpec::new("place", ValueType::Text),
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::earthquake()
    }
}

/// Validate rows against `schema` with the default missing-value markers
pub fn validate(rows: &[RawRecord], schema: &Schema) -> Result<Dataset, ComposeError> {
    validate_with(rows, schema, &NullConfig::default())
}

/// Validate rows against `schema`, treating `nulls` matches as missing
pub fn validate_with(
    rows: &[RawRecord],
    schema: &Schema,
    nulls: &NullConfig,
) -> Result<Dataset, ComposeError> {
    if rows.is_empty() {
        return Err(ComposeError::EmptyDataset);
    }

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|field| Column::with_capacity(field.value_type, rows.len()))
        .collect();
    let mut seen: Vec<Option<AHashSet<String>>> = schema
        .fields()
        .iter()
        .map(|field| field.unique.then(AHashSet::new))
        .collect();

    for (row_idx, record) in rows.iter().enumerate() {
        for ((field, column), keys) in schema
            .fields()
            .iter()
            .zip(columns.iter_mut())
            .zip(seen.iter_mut())
        {
            let schema_error = || ComposeError::Schema {
                field: field.name.clone(),
                expected_type: field.value_type,
                row: row_idx,
            };
            let value = record.get(&field.name).ok_or_else(schema_error)?;
            let numeric = push_value(column, value, nulls).ok_or_else(schema_error)?;

            if let (Some((min, max)), Some(v)) = (field.bounds, numeric) {
                if v < min || v > max {
                    return Err(ComposeError::OutOfBounds {
                        field: field.name.clone(),
                        value: v,
                        row: row_idx,
                    });
                }
            }

            if let Some(keys) = keys {
                if let Some(key) = last_key(column) {
                    if keys.contains(&key) {
                        return Err(ComposeError::DuplicateKey {
                            field: field.name.clone(),
                            value: key,
                            row: row_idx,
                        });
                    }
                    keys.insert(key);
                }
            }
        }
    }

    tracing::info!(
        "Validated {} rows against {} fields",
        rows.len(),
        schema.fields().len()
    );
    Ok(Dataset::new(schema.clone(), columns))
}

/// Coerce and append one value; yields the numeric value for bound checks
fn push_value(
    column: &mut Column,
    value: &serde_json::Value,
    nulls: &NullConfig,
) -> Option<Option<f64>> {
    match column {
        Column::Text(values) => values.push(coerce::text(value, nulls)?),
        Column::Instant(values) => values.push(coerce::instant(value, nulls)?),
        Column::Boolean(values) => values.push(coerce::boolean(value, nulls)?),
        Column::Real(values) => {
            let v = coerce::real(value, nulls)?;
            values.push(v);
            return Some(Some(v));
        }
        Column::Integer(values) => {
            let v = coerce::integer(value, nulls)?;
            values.push(v);
            return Some(Some(v as f64));
        }
    }
    Some(None)
}

/// Most recently pushed value, as a key string
fn last_key(column: &Column) -> Option<String> {
    match column {
        Column::Text(values) => values.last().cloned(),
        Column::Instant(values) => values.last().map(|t| t.to_rfc3339()),
        Column::Real(values) => values.last().map(f64::to_string),
        Column::Integer(values) => values.last().map(i64::to_string),
        Column::Boolean(values) => values.last().map(bool::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(sig: serde_json::Value) -> RawRecord {
        let mut record = RawRecord::new();
        record.insert("id".into(), json!("us6000abcd"));
        record.insert("time".into(), json!("2025-11-20T03:14:00Z"));
        record.insert("lat".into(), json!(-6.2));
        record.insert("lon".into(), json!(130.5));
        record.insert("depth".into(), json!(112.0));
        record.insert("mag".into(), json!(6.1));
        record.insert("sig".into(), sig);
        record.insert("tsunami".into(), json!(0));
        record.insert("place".into(), json!("Banda Sea"));
        record
    }

    #[test]
    fn test_empty_rows_rejected() {
        assert_eq!(
            validate(&[], &Schema::earthquake()).unwrap_err(),
            ComposeError::EmptyDataset
        );
    }

    #[test]
    fn test_fractional_sig_rejected() {
        let mut second = record(json!(572.5));
        second.insert("id".into(), json!("us6000abce"));
        let rows = vec![record(json!(572)), second];
        let err = validate(&rows, &Schema::earthquake()).unwrap_err();
        assert_eq!(
            err,
            ComposeError::Schema {
                field: "sig".to_string(),
                expected_type: ValueType::Integer,
                row: 1,
            }
        );
    }

    #[test]
    fn test_repeated_id_rejected() {
        let rows = vec![record(json!(572)), record(json!(640))];
        assert_eq!(
            validate(&rows, &Schema::earthquake()).unwrap_err(),
            ComposeError::DuplicateKey {
                field: "id".to_string(),
                value: "us6000abcd".to_string(),
                row: 1,
            }
        );

        let mut other = record(json!(640));
        other.insert("id".into(), json!("us6000abce"));
        let dataset = validate(&[record(json!(572)), other], &Schema::earthquake()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut row = record(json!(572));
        row.shift_remove("place");
        assert!(matches!(
            validate(&[row], &Schema::earthquake()),
            Err(ComposeError::Schema { field, expected_type: ValueType::Text, row: 0 }) if field == "place"
        ));
    }

    #[test]
    fn test_latitude_bounds() {
        let mut row = record(json!(572));
        row.insert("lat".into(), json!(91.5));
        assert_eq!(
            validate(&[row], &Schema::earthquake()).unwrap_err(),
            ComposeError::OutOfBounds {
                field: "lat".to_string(),
                value: 91.5,
                row: 0,
            }
        );
    }

    #[test]
    fn test_longitude_bounds() {
        let mut row = record(json!(572));
        row.insert("lon".into(), json!(181));
        assert_eq!(
            validate(&[row], &Schema::earthquake()).unwrap_err(),
            ComposeError::OutOfBounds {
                field: "lon".to_string(),
                value: 181.0,
                row: 0,
            }
        );
    }

    #[test]
    fn test_valid_rows_produce_dataset() {
        let mut second = record(json!("640"));
        second.insert("id".into(), json!("us6000abce"));
        let rows = vec![record(json!(572)), second];
        let dataset = validate(&rows, &Schema::earthquake()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.column("sig"), Some(&Column::Integer(vec![572, 640])));
        assert_eq!(dataset.column("tsunami"), Some(&Column::Boolean(vec![false, false])));
    }

    #[test]
    fn test_custom_schema() {
        let schema = Schema::new(vec![FieldSpec::new("felt", ValueType::Integer)]);
        let mut row = RawRecord::new();
        row.insert("felt".into(), json!(12));
        let dataset = validate(&[row], &schema).unwrap();
        assert_eq!(dataset.schema().fields().len(), 1);
    }
}
