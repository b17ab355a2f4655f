//! Mapharvest: a map-search listing harvester
//!
//! This crate drives a headless browser through a map-search results page,
//! exhausts the virtualized result list, visits every detail page under
//! bounded concurrency, and serializes the harvested records as CSV.

pub mod browser;
pub mod config;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod record;

use thiserror::Error;

/// Main error type for mapharvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Another job is already in flight")]
    JobInFlight,

    #[error("Scrollable results container not found (selector: {selector})")]
    ScrollSurfaceNotFound { selector: String },

    #[error("Page {url} did not become ready within {timeout_secs}s (selector: {selector})")]
    PageNotReady {
        url: String,
        selector: String,
        timeout_secs: u64,
    },

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Whether this error is the caller's fault (bad input, busy) rather
    /// than a failure inside the pipeline. A serving layer would map these
    /// to 4xx responses.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HarvestError::InvalidRequest(_) | HarvestError::JobInFlight | HarvestError::Config(_)
        )
    }
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
}

/// Result type alias for mapharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::ScraperConfig;
pub use job::{CancelToken, JobContext, JobRequest, JobSlot};
pub use progress::{ProgressEvent, ProgressPublisher, ProgressStatus};
pub use record::Record;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(HarvestError::InvalidRequest("missing targetUrl".into()).is_client_error());
        assert!(HarvestError::JobInFlight.is_client_error());
        assert!(!HarvestError::ScrollSurfaceNotFound {
            selector: "div[role='feed']".into()
        }
        .is_client_error());
        assert!(!HarvestError::Launch("no chrome".into()).is_client_error());
    }
}
