//! ONNX Runtime session management for classifier networks.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::ClassifyError;

use super::model::ModelKind;

/// Wraps an ONNX Runtime session for one classifier.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct ClassifierSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    model: ModelKind,
}

impl ClassifierSession {
    /// Load a classifier exported to ONNX.
    pub fn load(model_path: &Path, model: ModelKind) -> Result<Self, ClassifyError> {
        let inference_err = |message: String| ClassifyError::Inference {
            model: model.to_string(),
            message,
        };

        let session = Session::builder()
            .map_err(|e| inference_err(format!("Failed to create ONNX session builder: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                inference_err(format!(
                    "Failed to load ONNX model {}: {e}",
                    model_path.display()
                ))
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input_1".to_string());

        tracing::debug!(
            "Loaded {model} from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            model,
        })
    }

    /// Run inference on a preprocessed tensor and return the raw class scores
    /// (one per ImageNet class).
    pub fn run(&self, preprocessed: &Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        let inference_err = |message: String| ClassifyError::Inference {
            model: self.model.to_string(),
            message,
        };

        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data))
            .map_err(|e| inference_err(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| inference_err(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| inference_err(format!("ONNX inference failed: {e}")))?;

        let (_, first) = outputs
            .iter()
            .next()
            .ok_or_else(|| inference_err("Model produced no outputs".to_string()))?;

        let (shape, data) = first
            .try_extract_tensor::<f32>()
            .map_err(|e| inference_err(format!("Failed to extract output tensor: {e}")))?;

        // Output is [1, classes] or [classes].
        match shape.len() {
            1 => Ok(data.to_vec()),
            2 => {
                let classes = shape[1] as usize;
                Ok(data[..classes].to_vec())
            }
            _ => Err(inference_err(format!(
                "Unexpected output shape: {:?}",
                shape
            ))),
        }
    }
}
