//! Top-5 ImageNet classification with pretrained CNNs.
//!
//! Models are ONNX exports of the Keras applications, stored as
//! `{model_dir}/{slug}/model.onnx` next to a shared
//! `{model_dir}/imagenet_class_index.json`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use snapclass_core::classify::{ImageClassifier, ModelKind, OnnxClassifier};
//!
//! let classifier = OnnxClassifier::new(&config.model_dir(), config.classifier.layout)?;
//! let result = classifier.classify(&image, ModelKind::InceptionV3)?;
//! for p in &result.predictions {
//!     println!("{} {} {:.2}%", p.class_id, p.class_name, p.confidence);
//! }
//! ```

pub(crate) mod labels;
pub(crate) mod model;
pub(crate) mod preprocess;
pub(crate) mod session;
pub(crate) mod topk;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::DynamicImage;

use crate::error::ClassifyError;
use crate::types::ClassificationResult;

pub use self::labels::LabelIndex;
pub use self::model::{ModelKind, Normalization, TensorLayout};
pub use self::preprocess::preprocess;
pub use self::topk::{as_percentage, to_probabilities, top_k, TOP_K};

use self::session::ClassifierSession;

/// ONNX model filename inside each model directory.
pub const MODEL_FILENAME: &str = "model.onnx";

/// Shared label index filename.
pub const LABELS_FILENAME: &str = "imagenet_class_index.json";

/// Anything that can turn an image into a top-5 result.
pub trait ImageClassifier: Send + Sync {
    fn classify(
        &self,
        image: &DynamicImage,
        model: ModelKind,
    ) -> Result<ClassificationResult, ClassifyError>;
}

/// Decode raw scores for one image into a `ClassificationResult`.
pub fn decode_predictions(
    scores: &[f32],
    labels: &LabelIndex,
    model: ModelKind,
) -> ClassificationResult {
    let probabilities = to_probabilities(scores);
    ClassificationResult {
        model,
        predictions: top_k(&probabilities, labels, TOP_K),
    }
}

/// Classifier backed by ONNX Runtime. Sessions are loaded on first use and
/// kept for the lifetime of the classifier.
pub struct OnnxClassifier {
    model_dir: PathBuf,
    layout: TensorLayout,
    labels: LabelIndex,
    sessions: Mutex<HashMap<ModelKind, Arc<ClassifierSession>>>,
}

impl OnnxClassifier {
    /// Create a classifier reading models from `model_dir`. Fails if the
    /// label index is missing.
    pub fn new(model_dir: &Path, layout: TensorLayout) -> Result<Self, ClassifyError> {
        let labels = LabelIndex::load(&Self::labels_path(model_dir))?;
        tracing::debug!("Loaded {} ImageNet labels", labels.len());
        Ok(Self {
            model_dir: model_dir.to_path_buf(),
            layout,
            labels,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Expected path of a model's ONNX file.
    pub fn model_path(model_dir: &Path, model: ModelKind) -> PathBuf {
        model_dir.join(model.slug()).join(MODEL_FILENAME)
    }

    /// Expected path of the label index.
    pub fn labels_path(model_dir: &Path) -> PathBuf {
        model_dir.join(LABELS_FILENAME)
    }

    /// Check whether a model file exists on disk.
    pub fn model_exists(model_dir: &Path, model: ModelKind) -> bool {
        Self::model_path(model_dir, model).exists()
    }

    fn session(&self, model: ModelKind) -> Result<Arc<ClassifierSession>, ClassifyError> {
        let mut sessions = self.sessions.lock().map_err(|e| ClassifyError::Inference {
            model: model.to_string(),
            message: format!("Session cache lock poisoned: {e}"),
        })?;

        if let Some(session) = sessions.get(&model) {
            return Ok(Arc::clone(session));
        }

        let path = Self::model_path(&self.model_dir, model);
        if !path.exists() {
            return Err(ClassifyError::ModelMissing {
                path,
                hint: format!(
                    "Install it with `snapclass models install {} <file.onnx>`.",
                    model.slug()
                ),
            });
        }

        tracing::info!("Loading {model} from {:?}", path);
        let session = Arc::new(ClassifierSession::load(&path, model)?);
        sessions.insert(model, Arc::clone(&session));
        Ok(session)
    }
}

impl ImageClassifier for OnnxClassifier {
    fn classify(
        &self,
        image: &DynamicImage,
        model: ModelKind,
    ) -> Result<ClassificationResult, ClassifyError> {
        let start = std::time::Instant::now();
        let session = self.session(model)?;
        let tensor = preprocess(image, model, self.layout);
        let scores = session.run(&tensor)?;
        let result = decode_predictions(&scores, &self.labels, model);
        tracing::debug!("Classified with {model} in {:?}", start.elapsed());
        Ok(result)
    }
}
