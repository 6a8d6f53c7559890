//! Snapclass Core - fetch, classify and record images.
//!
//! Snapclass pulls photos from Unsplash or Pexels (or takes local files),
//! runs them through a pretrained ImageNet network and appends the top-5
//! labels to a spreadsheet.
//!
//! # Architecture
//!
//! ```text
//! Provider API → Quota check → Download → Store → Decode → Classify → Results sheet
//! Local file   ───────────────────────────→ Copy ──┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use snapclass_core::{Config, ModelKind, Snapclass};
//!
//! #[tokio::main]
//! async fn main() -> snapclass_core::Result<()> {
//!     let snapclass = Snapclass::new(Config::load()?)?;
//!
//!     let image = snapclass.classify_upload("./cat.jpg".as_ref(), ModelKind::ResNet50).await?;
//!     snapclass.results_sheet().append(&image.result, &image.file_name)?;
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod keys;
pub mod output;
pub mod pipeline;
pub mod quota;
pub mod results;
pub mod storage;
pub mod types;

pub use classify::{ImageClassifier, ModelKind, OnnxClassifier, TensorLayout};
pub use config::Config;
pub use error::{
    ClassifyError, ConfigError, FetchError, QuotaError, Result, ResultsError, SnapclassError,
};
pub use fetch::{FetchObserver, FetchOutcome, Fetcher, StopReason};
pub use output::{OutputFormat, OutputWriter};
pub use quota::UsageCounter;
pub use results::ResultsSheet;
pub use types::{
    ClassificationResult, ClassifiedImage, FetchedImage, Prediction, Provider, SiteSelection,
};

use std::path::Path;
use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source label used for local images.
pub const UPLOAD_SOURCE: &str = "Upload";

/// Main entry point: ties config, classifier, quota and results together.
pub struct Snapclass {
    config: Config,
    classifier: Arc<dyn ImageClassifier>,
}

impl Snapclass {
    /// Create an instance backed by ONNX Runtime models from `config`.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Snapclass v{}", VERSION);
        let classifier = OnnxClassifier::new(&config.model_dir(), config.classifier.layout)?;
        Ok(Self::with_classifier(config, Arc::new(classifier)))
    }

    /// Create an instance around any classifier.
    pub fn with_classifier(config: Config, classifier: Arc<dyn ImageClassifier>) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The default model from config.
    pub fn default_model(&self) -> Result<ModelKind> {
        Ok(self.config.classifier.default_model.parse()?)
    }

    /// Usage counter bound to the configured file and limit.
    pub fn usage_counter(&self) -> UsageCounter {
        UsageCounter::new(self.config.usage_path(), self.config.quota.limit)
    }

    pub fn results_sheet(&self) -> ResultsSheet {
        ResultsSheet::new(self.config.results_path())
    }

    /// A fetcher sharing this instance's classifier.
    pub fn fetcher(&self) -> Result<Fetcher> {
        Ok(Fetcher::new(
            &self.config,
            self.usage_counter(),
            Arc::clone(&self.classifier),
        )?)
    }

    /// Copy a local image into the uploads directory and classify it.
    ///
    /// The returned `file_name` is the original name, which is what the
    /// results sheet records for uploads.
    pub async fn classify_upload(&self, path: &Path, model: ModelKind) -> Result<ClassifiedImage> {
        let stored = storage::save_uploaded_image(path, &self.config.uploads_dir())?;
        let image = pipeline::decode_file(&stored)?;

        let classifier = Arc::clone(&self.classifier);
        let result = tokio::task::spawn_blocking(move || classifier.classify(&image, model))
            .await
            .map_err(|e| ClassifyError::Inference {
                model: model.to_string(),
                message: format!("Classification task failed: {e}"),
            })??;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(ClassifiedImage {
            file_path: stored,
            file_name,
            source: UPLOAD_SOURCE.to_string(),
            result,
        })
    }
}
