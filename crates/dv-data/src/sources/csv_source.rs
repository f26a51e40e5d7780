use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use csv::ReaderBuilder;
use serde_json::Value;

use super::RecordSource;
use crate::{DataError, RawRecord};

/// CSV source reading header-first files into raw records.
///
/// Every cell arrives as a string; typing happens during validation.
pub struct CsvSource {
    /// Path to the CSV file
    path: PathBuf,
    /// Field delimiter
    delimiter: u8,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse CSV text from any reader
    pub fn parse<R: Read>(reader: R, delimiter: u8) -> Result<Vec<RawRecord>, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let record: RawRecord = headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.clone(), Value::String(cell.to_string())))
                .collect();
            records.push(record);
        }

        Ok(records)
    }
}

impl RecordSource for CsvSource {
    fn read_records(&self) -> Result<Vec<RawRecord>, DataError> {
        let file = File::open(&self.path)?;
        Self::parse(BufReader::new(file), self.delimiter)
    }

    fn source_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{validate, Schema};
    use dv_core::ComposeError;

    const EVENTS: &str = "\
id,time,lat,lon,depth,mag,sig,tsunami,place
us7000r1a1,2025-11-20T04:12:33.120Z,38.1,142.9,10.0,6.9,732,1,near the east coast of Honshu
us7000r1b4,2025-11-20 16:40:02,-17.8,-178.2,560.4,5.4,449,0,Fiji region
";

    #[test]
    fn test_parse_and_validate() {
        let records = CsvSource::parse(EVENTS.as_bytes(), b',').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["place"], Value::String("Fiji region".to_string()));

        let dataset = validate(&records, &Schema::earthquake()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_blank_cell_is_missing() {
        let text = EVENTS.replace(",449,", ",,");
        let records = CsvSource::parse(text.as_bytes(), b',').unwrap();
        assert!(matches!(
            validate(&records, &Schema::earthquake()),
            Err(ComposeError::Schema { row: 1, .. })
        ));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let text = EVENTS.replace(',', ";");
        let records = CsvSource::parse(text.as_bytes(), b';').unwrap();
        assert_eq!(records[0]["mag"], Value::String("6.9".to_string()));
    }

    #[test]
    fn test_missing_file() {
        let source = CsvSource::new("/nonexistent/events.csv");
        assert_eq!(source.source_name(), "events.csv");
        assert!(matches!(source.read_records(), Err(DataError::Io(_))));
    }
}
