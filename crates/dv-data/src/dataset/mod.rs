//! Validated, columnar dataset

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use dv_core::{FieldCatalog, ValueType};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::schema::{FieldSpec, Schema};

/// Identity of one validated dataset.
///
/// Every successful validation mints a new id, so anything keyed by it is
/// invalidated by a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(Uuid);

impl DatasetId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Values of one field, in row order
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    Instant(Vec<DateTime<Utc>>),
    Real(Vec<f64>),
    Integer(Vec<i64>),
    Boolean(Vec<bool>),
}

impl Column {
    pub fn with_capacity(value_type: ValueType, capacity: usize) -> Self {
        match value_type {
            ValueType::Text => Column::Text(Vec::with_capacity(capacity)),
            ValueType::Instant => Column::Instant(Vec::with_capacity(capacity)),
            ValueType::Real => Column::Real(Vec::with_capacity(capacity)),
            ValueType::Integer => Column::Integer(Vec::with_capacity(capacity)),
            ValueType::Boolean => Column::Boolean(Vec::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Instant(v) => v.len(),
            Column::Real(v) => v.len(),
            Column::Integer(v) => v.len(),
            Column::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scan the column once for its domain; `None` when empty
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Column::Real(v) => min_max(v.iter().copied()),
            Column::Integer(v) => min_max(v.iter().map(|x| *x as f64)),
            Column::Instant(v) => min_max(v.iter().map(|t| t.timestamp_millis() as f64)),
            Column::Text(v) => categories(v.iter().cloned()),
            Column::Boolean(v) => categories(v.iter().map(|b| b.to_string())),
        }
    }

    /// JSON value of row `idx`
    fn json_value(&self, idx: usize) -> Value {
        match self {
            Column::Text(v) => Value::String(v[idx].clone()),
            Column::Instant(v) => {
                Value::String(v[idx].to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Column::Real(v) => Value::from(v[idx]),
            Column::Integer(v) => Value::from(v[idx]),
            Column::Boolean(v) => Value::Bool(v[idx]),
        }
    }
}

/// Extent of a field's values in the current dataset.
///
/// Temporal domains are expressed in epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Continuous { min: f64, max: f64 },
    Categorical(Vec<String>),
}

impl Domain {
    /// `(min, max)` of a continuous domain
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Domain::Continuous { min, max } => Some((*min, *max)),
            Domain::Categorical(_) => None,
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<Domain> {
    values.fold(None, |acc, v| match acc {
        None => Some(Domain::Continuous { min: v, max: v }),
        Some(Domain::Continuous { min, max }) => Some(Domain::Continuous {
            min: min.min(v),
            max: max.max(v),
        }),
        other => other,
    })
}

fn categories(values: impl Iterator<Item = String>) -> Option<Domain> {
    let distinct: BTreeSet<String> = values.collect();
    (!distinct.is_empty()).then(|| Domain::Categorical(distinct.into_iter().collect()))
}

/// Non-empty collection of rows satisfying a schema
#[derive(Debug, Clone)]
pub struct Dataset {
    id: DatasetId,
    schema: Schema,
    columns: Vec<Column>,
    len: usize,
}

impl Dataset {
    /// Assemble from validated columns, one per schema field
    pub(crate) fn new(schema: Schema, columns: Vec<Column>) -> Self {
        let len = columns.first().map(Column::len).unwrap_or(0);
        Self {
            id: DatasetId::new(),
            schema,
            columns,
            len,
        }
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.schema.field(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.schema
            .fields()
            .iter()
            .position(|field| field.name == name)
            .map(|idx| &self.columns[idx])
    }

    /// Domain of `name`, scanned from the current rows
    pub fn domain(&self, name: &str) -> Option<Domain> {
        self.column(name).and_then(Column::domain)
    }

    /// Rows as JSON objects, for inline embedding in a document
    pub fn records(&self) -> Vec<Value> {
        (0..self.len)
            .map(|idx| {
                let row: Map<String, Value> = self
                    .schema
                    .fields()
                    .iter()
                    .zip(&self.columns)
                    .map(|(field, column)| (field.name.clone(), column.json_value(idx)))
                    .collect();
                Value::Object(row)
            })
            .collect()
    }
}

impl FieldCatalog for Dataset {
    fn value_type(&self, name: &str) -> Option<ValueType> {
        self.field(name).map(|field| field.value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;
    use crate::RawRecord;
    use dv_core::SemanticType;
    use serde_json::json;

    fn rows() -> Vec<RawRecord> {
        [
            ("a", "2025-11-20T01:00:00Z", 5.0, 10.0, 400, true),
            ("b", "2025-11-21T09:30:00Z", 7.8, 35.5, 1200, false),
            ("c", "2025-11-20T18:45:00Z", 6.2, 600.0, 590, false),
        ]
        .iter()
        .map(|(id, time, mag, depth, sig, tsunami)| {
            let mut record = RawRecord::new();
            record.insert("id".into(), json!(id));
            record.insert("time".into(), json!(time));
            record.insert("lat".into(), json!(12.0));
            record.insert("lon".into(), json!(-45.0));
            record.insert("depth".into(), json!(depth));
            record.insert("mag".into(), json!(mag));
            record.insert("sig".into(), json!(sig));
            record.insert("tsunami".into(), json!(tsunami));
            record.insert("place".into(), json!(format!("event {id}")));
            record
        })
        .collect()
    }

    #[test]
    fn test_domains() {
        let dataset = validate(&rows(), &Schema::earthquake()).unwrap();

        assert_eq!(dataset.domain("mag"), Some(Domain::Continuous { min: 5.0, max: 7.8 }));
        assert_eq!(dataset.domain("sig").and_then(|d| d.bounds()), Some((400.0, 1200.0)));

        let (start, end) = dataset.domain("time").and_then(|d| d.bounds()).unwrap();
        assert_eq!(end - start, (32.0 * 60.0 + 30.0) * 60.0 * 1000.0);

        assert_eq!(
            dataset.domain("tsunami"),
            Some(Domain::Categorical(vec!["false".to_string(), "true".to_string()]))
        );
        assert_eq!(dataset.domain("felt"), None);
    }

    #[test]
    fn test_catalog() {
        let dataset = validate(&rows(), &Schema::earthquake()).unwrap();
        assert_eq!(dataset.value_type("sig"), Some(ValueType::Integer));
        assert_eq!(dataset.semantic_type("time"), Some(SemanticType::Temporal));
        assert_eq!(dataset.semantic_type("place"), Some(SemanticType::Nominal));
        assert_eq!(dataset.value_type("felt"), None);
    }

    #[test]
    fn test_records_round_out_types() {
        let dataset = validate(&rows(), &Schema::earthquake()).unwrap();
        let records = dataset.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1]["time"], json!("2025-11-21T09:30:00.000Z"));
        assert_eq!(records[1]["sig"], json!(1200));
        assert_eq!(records[0]["tsunami"], json!(true));
    }

    #[test]
    fn test_each_validation_gets_new_identity() {
        let first = validate(&rows(), &Schema::earthquake()).unwrap();
        let second = validate(&rows(), &Schema::earthquake()).unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(first.clone().id(), first.id());
    }
}
