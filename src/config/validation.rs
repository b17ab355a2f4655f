use crate::config::types::{ExtractionConfig, ScraperConfig, ScrollConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_scroll_config(&config.scroll)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates scroll configuration
fn validate_scroll_config(config: &ScrollConfig) -> Result<(), ConfigError> {
    if config.container_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "scroll.container-selector cannot be empty".to_string(),
        ));
    }

    if config.end_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "scroll.end-marker cannot be empty".to_string(),
        ));
    }

    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(format!(
            "scroll.max-iterations must be >= 1, got {}",
            config.max_iterations
        )));
    }

    if config.scroll_delta_px < 1 {
        return Err(ConfigError::Validation(format!(
            "scroll.scroll-delta-px must be >= 1, got {}",
            config.scroll_delta_px
        )));
    }

    Ok(())
}

/// Validates extraction configuration
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "extraction.batch-size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    if config.ready_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "extraction.ready-selector cannot be empty".to_string(),
        ));
    }

    if config.ready_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "extraction.ready-timeout-secs must be >= 1, got {}",
            config.ready_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output.directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ScraperConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&ScraperConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = ScraperConfig::default();
        config.extraction.batch_size = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_oversized_batch_rejected() {
        let mut config = ScraperConfig::default();
        config.extraction.batch_size = 500;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_end_marker_rejected() {
        let mut config = ScraperConfig::default();
        config.scroll.end_marker = "   ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_iterations_rejected() {
        let mut config = ScraperConfig::default();
        config.scroll.max_iterations = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_selector_rejected() {
        let mut config = ScraperConfig::default();
        config.scroll.container_selector = String::new();
        assert!(validate(&config).is_err());
    }
}
