//! Record sources feeding the dataset adapter

pub mod csv_source;
pub mod json_source;

pub use csv_source::CsvSource;
pub use json_source::JsonSource;

use crate::config::NullConfig;
use crate::dataset::Dataset;
use crate::schema::{validate_with, Schema};
use crate::{DataError, RawRecord};

/// Anything that yields loosely typed rows
pub trait RecordSource {
    /// Read every record from the source
    fn read_records(&self) -> Result<Vec<RawRecord>, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}

/// Read a source and validate it into a dataset
pub fn load_dataset(
    source: &dyn RecordSource,
    schema: &Schema,
    nulls: &NullConfig,
) -> Result<Dataset, DataError> {
    let records = source.read_records()?;
    tracing::info!(
        "Read {} records from {}",
        records.len(),
        source.source_name()
    );
    Ok(validate_with(&records, schema, nulls)?)
}
