//! Catalog-Sweep: a paginated product-listing harvester
//!
//! This crate walks the result pages of an e-commerce search feed, extracts
//! one record per product (name, price, MPN, URL) and writes them to a CSV
//! file. Pages are acquired either with plain HTTP requests or through a
//! WebDriver-controlled browser; both feed the same extractor and paginator.

pub mod config;
pub mod extract;
pub mod harvest;
pub mod output;
pub mod record;
pub mod source;
pub mod url;

use thiserror::Error;

/// Main error type for Catalog-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to open browser session: {0}")]
    Browser(#[from] fantoccini::error::NewSessionError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Catalog-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::SweepConfig;
pub use harvest::{run_harvest, Harvest, Strategy};
pub use record::ProductRecord;
