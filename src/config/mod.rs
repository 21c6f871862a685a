//! Configuration module for Catalog-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalog_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("catalog-sweep.toml")).unwrap();
//! println!("Harvesting from: {}", config.target.search_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, HttpConfig, OutputConfig, PaginationConfig, SelectorConfig, SweepConfig,
    TargetConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
pub(crate) use validation::compile_selector;
