//! Error types for Snapclass.
//!
//! Errors are organized by component so messages carry the context a user
//! needs to act on them (file paths, provider names, model names).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Snapclass operations.
#[derive(Error, Debug)]
pub enum SnapclassError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Usage counter errors
    #[error("Usage counter error: {0}")]
    Quota(#[from] QuotaError),

    /// Provider/network errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Inference errors
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Spreadsheet errors
    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors from the persisted API usage counter.
#[derive(Error, Debug)]
pub enum QuotaError {
    /// Reading or writing the usage file failed
    #[error("Cannot access usage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The usage file exists but does not hold a JSON object of counts
    #[error("Usage file {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Errors raised while talking to an image provider.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP request could not be sent or the connection failed
    #[error("{provider} request failed: {message}")]
    Network { provider: String, message: String },

    /// The provider answered with an unexpected status
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered with a body we could not interpret
    #[error("Unexpected {provider} response: {message}")]
    Malformed { provider: String, message: String },

    /// Storing the downloaded image failed
    #[error("Failed to store image at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while preparing or running inference.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Model name not in the supported set
    #[error("Unsupported model: {0}")]
    UnknownModel(String),

    /// ONNX model file or label index is missing
    #[error("Model file not found: {path}. {hint}")]
    ModelMissing { path: PathBuf, hint: String },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Label index could not be parsed
    #[error("Invalid label index {path}: {message}")]
    Labels { path: PathBuf, message: String },

    /// ONNX Runtime failed to load or run the model
    #[error("Inference failed for {model}: {message}")]
    Inference { model: String, message: String },
}

/// Errors raised by the results spreadsheet writer.
#[derive(Error, Debug)]
pub enum ResultsError {
    /// Another program holds the spreadsheet open
    #[error(
        "{} is currently opened by another program. Please close it so the classification results can be written.",
        path.display()
    )]
    Locked { path: PathBuf },

    /// Reading the existing workbook failed
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Building the workbook failed
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Filesystem failure other than a lock conflict
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Snapclass results.
pub type Result<T> = std::result::Result<T, SnapclassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_message_names_file() {
        let err = ResultsError::Locked {
            path: PathBuf::from("output/Classification_Results.xlsx"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Classification_Results.xlsx"));
        assert!(msg.contains("close it"));
    }

    #[test]
    fn test_component_errors_convert_to_top_level() {
        let err: SnapclassError = ClassifyError::UnknownModel("Other".into()).into();
        assert!(matches!(err, SnapclassError::Classify(_)));
        assert!(err.to_string().contains("Unsupported model: Other"));
    }
}
