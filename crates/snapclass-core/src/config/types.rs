//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify::TensorLayout;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where ONNX models and the label index are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.snapclass/models"),
        }
    }
}

/// Local files and directories. Relative paths resolve against the
/// working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding provider access keys
    pub keys_file: PathBuf,

    /// JSON file holding per-provider request counts
    pub usage_file: PathBuf,

    /// Directory for the results spreadsheet
    pub output_dir: PathBuf,

    /// Results spreadsheet filename inside `output_dir`
    pub results_file: String,

    /// Where Unsplash downloads are stored
    pub unsplash_dir: PathBuf,

    /// Where Pexels downloads are stored
    pub pexels_dir: PathBuf,

    /// Where copies of local (uploaded) images are stored
    pub uploads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            keys_file: PathBuf::from("config.json"),
            usage_file: PathBuf::from("api_usage.txt"),
            output_dir: PathBuf::from("output"),
            results_file: "Classification_Results.xlsx".to_string(),
            unsplash_dir: PathBuf::from("unsplash_images"),
            pexels_dir: PathBuf::from("pexels_images"),
            uploads_dir: PathBuf::from("local_images"),
        }
    }
}

/// API usage quota.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Maximum successful provider calls per reset cycle.
    /// The API_USAGE_LIMIT environment variable takes precedence.
    pub limit: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { limit: 500 }
    }
}

/// Provider endpoints and request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Unsplash API base URL
    pub unsplash_endpoint: String,

    /// Pexels API base URL
    pub pexels_endpoint: String,

    /// Search term sent to Pexels
    pub pexels_query: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Upper bound on images per fetch run
    pub max_count: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            unsplash_endpoint: "https://api.unsplash.com".to_string(),
            pexels_endpoint: "https://api.pexels.com/v1".to_string(),
            pexels_query: "nature".to_string(),
            timeout_ms: 30_000,
            max_count: 200,
        }
    }
}

/// Classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model used when none is given on the command line
    pub default_model: String,

    /// Input tensor layout of the exported models ("nhwc" or "nchw")
    pub layout: TensorLayout,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_model: "ResNet50".to_string(),
            layout: TensorLayout::Nhwc,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
