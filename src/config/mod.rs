//! Configuration module for mapharvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. All settings have defaults matching the behavior of a plain run
//! against Google Maps.
//!
//! # Example
//!
//! ```no_run
//! use mapharvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mapharvest.toml")).unwrap();
//! println!("Batch size: {}", config.extraction.batch_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, ExtractionConfig, OutputConfig, ScraperConfig, ScrollConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
