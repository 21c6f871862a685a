use crate::output::OutputError;
use crate::record::{ProductRecord, CSV_HEADER};
use std::path::Path;

/// Writes records to a CSV file, replacing any existing file
///
/// The header row is always written, so a run without records still leaves
/// a valid file behind.
///
/// # Arguments
///
/// * `records` - Records in the order they were collected
/// * `path` - Destination file
///
/// # Returns
///
/// * `Ok(())` - File written and flushed
/// * `Err(OutputError)` - The file could not be created or written
pub fn write_csv(records: &[ProductRecord], path: &Path) -> Result<(), OutputError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
