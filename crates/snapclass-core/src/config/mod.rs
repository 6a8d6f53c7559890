//! Configuration management for Snapclass.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a missing file or a
//! partial file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::types::Provider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `quota.limit`.
pub const USAGE_LIMIT_ENV: &str = "API_USAGE_LIMIT";

/// Root configuration structure for Snapclass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Local files and directories
    pub storage: StorageConfig,

    /// API usage quota
    pub quota: QuotaConfig,

    /// Provider endpoints
    pub fetch: FetchConfig,

    /// Classifier settings
    pub classifier: ClassifierConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist. The
    /// `API_USAGE_LIMIT` environment variable is applied in both cases.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_usage_limit_override(std::env::var(USAGE_LIMIT_ENV).ok().as_deref())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Falls back to ~/.snapclass/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "snapclass", "snapclass")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".snapclass").join("config.toml")
            })
    }

    /// Apply a usage limit taken from the environment, if one is set.
    pub fn apply_usage_limit_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = value else {
            return Ok(());
        };
        let limit = raw.trim().parse::<u32>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "{USAGE_LIMIT_ENV} must be a non-negative integer, got {raw:?}"
            ))
        })?;
        tracing::debug!("Usage limit overridden by {USAGE_LIMIT_ENV}: {limit}");
        self.quota.limit = limit;
        Ok(())
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        expand(&self.general.model_dir)
    }

    /// Path of the access-key file.
    pub fn keys_path(&self) -> PathBuf {
        expand(&self.storage.keys_file)
    }

    /// Path of the usage-count file.
    pub fn usage_path(&self) -> PathBuf {
        expand(&self.storage.usage_file)
    }

    /// Path of the results spreadsheet.
    pub fn results_path(&self) -> PathBuf {
        expand(&self.storage.output_dir).join(&self.storage.results_file)
    }

    /// Output directory holding the results spreadsheet.
    pub fn output_dir(&self) -> PathBuf {
        expand(&self.storage.output_dir)
    }

    /// Download directory for a provider.
    pub fn provider_dir(&self, provider: Provider) -> PathBuf {
        match provider {
            Provider::Unsplash => expand(&self.storage.unsplash_dir),
            Provider::Pexels => expand(&self.storage.pexels_dir),
        }
    }

    /// Directory holding copies of local images.
    pub fn uploads_dir(&self) -> PathBuf {
        expand(&self.storage.uploads_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
