//! JSON and GeoJSON record sources

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::RecordSource;
use crate::{DataError, RawRecord};

/// Property names the event feeds use for fields the contract abbreviates
const RENAMES: &[(&str, &str)] = &[("magnitude", "mag"), ("significance", "sig")];

/// JSON source accepting either an array of row objects or a GeoJSON
/// `FeatureCollection` of point events.
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a JSON document from any reader
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RawRecord>, DataError> {
        let document: Value = serde_json::from_reader(reader)?;
        Self::records_from_value(document)
    }

    /// Flatten a parsed document into records
    pub fn records_from_value(document: Value) -> Result<Vec<RawRecord>, DataError> {
        match document {
            Value::Array(rows) => rows
                .into_iter()
                .enumerate()
                .map(|(idx, row)| match row {
                    Value::Object(fields) => Ok(fields.into_iter().collect()),
                    _ => Err(DataError::Format(format!("element {idx} is not an object"))),
                })
                .collect(),
            Value::Object(mut object)
                if object.get("type").and_then(Value::as_str) == Some("FeatureCollection") =>
            {
                match object.remove("features") {
                    Some(Value::Array(features)) => features
                        .into_iter()
                        .enumerate()
                        .map(|(idx, feature)| flatten_feature(idx, feature))
                        .collect(),
                    _ => Err(DataError::Format(
                        "FeatureCollection without a features array".to_string(),
                    )),
                }
            }
            _ => Err(DataError::Format(
                "expected an array of objects or a GeoJSON FeatureCollection".to_string(),
            )),
        }
    }
}

/// Turn one point feature into a flat record.
///
/// Coordinates are `[lon, lat, depth]`; the feature id becomes `id`.
fn flatten_feature(idx: usize, feature: Value) -> Result<RawRecord, DataError> {
    let Value::Object(mut feature) = feature else {
        return Err(DataError::Format(format!("feature {idx} is not an object")));
    };

    let mut record: RawRecord = match feature.remove("properties") {
        Some(Value::Object(properties)) => properties.into_iter().collect(),
        Some(Value::Null) | None => RawRecord::new(),
        Some(_) => {
            return Err(DataError::Format(format!(
                "feature {idx} has non-object properties"
            )))
        }
    };

    for (from, to) in RENAMES {
        if !record.contains_key(*to) {
            if let Some(value) = record.shift_remove(*from) {
                record.insert(to.to_string(), value);
            }
        }
    }

    if let Some(id) = feature.remove("id") {
        record.insert("id".to_string(), id);
    }

    if let Some(coordinates) = point_coordinates(&feature) {
        for (name, value) in ["lon", "lat", "depth"].iter().zip(coordinates) {
            record.insert(name.to_string(), value.clone());
        }
    }

    Ok(record)
}

fn point_coordinates(feature: &Map<String, Value>) -> Option<&Vec<Value>> {
    feature
        .get("geometry")?
        .get("coordinates")?
        .as_array()
}

impl RecordSource for JsonSource {
    fn read_records(&self) -> Result<Vec<RawRecord>, DataError> {
        let file = File::open(&self.path)?;
        Self::parse(BufReader::new(file))
    }

    fn source_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{validate, Schema};
    use serde_json::json;

    #[test]
    fn test_array_of_objects() {
        let records =
            JsonSource::records_from_value(json!([{"id": "a", "mag": 5.1}, {"id": "b"}])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["mag"], json!(5.1));
    }

    #[test]
    fn test_non_object_row_rejected() {
        let err = JsonSource::records_from_value(json!([{"id": "a"}, 3])).unwrap_err();
        assert!(matches!(err, DataError::Format(msg) if msg.contains("element 1")));
    }

    #[test]
    fn test_feature_collection() {
        let document = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "us6000rk2m",
                "properties": {
                    "magnitude": 6.3,
                    "place": "South Sandwich Islands region",
                    "time": 1763683200000_i64,
                    "significance": 611,
                    "tsunami": 0
                },
                "geometry": {"type": "Point", "coordinates": [-26.4, -58.9, 35.0]}
            }]
        });

        let records = JsonSource::records_from_value(document).unwrap();
        assert_eq!(records[0]["mag"], json!(6.3));
        assert_eq!(records[0]["sig"], json!(611));
        assert_eq!(records[0]["lon"], json!(-26.4));
        assert_eq!(records[0]["depth"], json!(35.0));
        assert!(!records[0].contains_key("magnitude"));

        let dataset = validate(&records, &Schema::earthquake()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_unsupported_document() {
        let parsed = JsonSource::parse("{\"type\": \"Feature\"}".as_bytes());
        assert!(matches!(parsed, Err(DataError::Format(_))));

        let parsed = JsonSource::parse("not json".as_bytes());
        assert!(matches!(parsed, Err(DataError::Json(_))));
    }
}
