//! Configuration validation with range checks.

use crate::classify::ModelKind;
use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_ms must be > 0".into(),
            ));
        }
        if self.fetch.max_count == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.max_count must be > 0".into(),
            ));
        }
        if self.fetch.pexels_query.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "fetch.pexels_query must not be empty".into(),
            ));
        }
        if self.storage.results_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.results_file must not be empty".into(),
            ));
        }
        if self.classifier.default_model.parse::<ModelKind>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "classifier.default_model must be one of ResNet50, VGG16, InceptionV3 (got {:?})",
                self.classifier.default_model
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.fetch.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_unknown_default_model() {
        let mut config = Config::default();
        config.classifier.default_model = "Other".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_model"));
    }

    #[test]
    fn test_validate_rejects_empty_query() {
        let mut config = Config::default();
        config.fetch.pexels_query = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pexels_query"));
    }
}
