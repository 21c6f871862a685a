//! Output module for harvested records
//!
//! This module handles:
//! - Writing product records to CSV
//! - Recording per-run statistics

mod csv_writer;
pub mod stats;

pub use csv_writer::write_csv;
pub use stats::HarvestStats;

use thiserror::Error;

/// Errors raised while writing harvest output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
