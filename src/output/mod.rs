//! Output module for serializing harvested records
//!
//! This module handles:
//! - Rendering a record sequence as CSV text
//! - Writing the CSV to the configured output directory

use crate::record::Record;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Serializes records as CSV text, header row first
///
/// Rows appear in the order the records were extracted. An empty record
/// sequence still yields the header row, so a search with no results
/// produces a well-formed file.
///
/// # Arguments
///
/// * `records` - Records in listing order
///
/// # Returns
///
/// * `Ok(String)` - CSV text including the header row
/// * `Err(HarvestError)` - Serialization failed
pub fn records_to_csv(records: &[Record]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if records.is_empty() {
        writer.write_record(Record::FIELD_NAMES)?;
    } else {
        for record in records {
            writer.serialize(record)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;
    // The writer only ever receives UTF-8 field data
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes records to `<directory>/<output_name>.csv`
///
/// The `.csv` extension is appended when the name does not already carry it.
/// The directory is created if missing.
pub fn write_csv_file(records: &[Record], directory: &Path, output_name: &str) -> Result<PathBuf> {
    let csv = records_to_csv(records)?;

    let file_name = if output_name.to_ascii_lowercase().ends_with(".csv") {
        output_name.to_string()
    } else {
        format!("{}.csv", output_name)
    };

    std::fs::create_dir_all(directory)?;
    let path = directory.join(file_name);
    std::fs::write(&path, csv)?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(path)
}
