pub mod onnx;
pub mod predictor;
pub mod preprocess;
#[cfg(feature = "torch")]
pub mod torch;

use std::path::Path;
use std::sync::Arc;

pub use predictor::{interpret, Predictor};
pub use preprocess::{preprocess, ImageTensor, INPUT_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad { path: String, reason: String },
    #[error("Unsupported model format: {0}")]
    UnsupportedModel(String),
    #[error("Preprocessing error: {0}")]
    PreprocessingError(#[from] image::ImageError),
    #[error("Model error: {0}")]
    ModelError(String),
    #[error("Model returned {actual} scores, expected {expected}")]
    UnexpectedOutput { expected: usize, actual: usize },
    #[error("Model returned non-finite scores")]
    NonFiniteOutput,
}

/// A pre-trained model mapping one image tensor to a score per disease class.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError>;
}

/// Picks a backend from the model file extension.
pub fn load_classifier(model_path: &Path) -> Result<Arc<dyn Classifier>, InferenceError> {
    let extension = model_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "onnx" => Ok(Arc::new(onnx::OnnxClassifier::load(model_path)?)),
        #[cfg(feature = "torch")]
        "pt" | "pth" => Ok(Arc::new(torch::TorchClassifier::load(model_path)?)),
        #[cfg(not(feature = "torch"))]
        "pt" | "pth" => Err(InferenceError::UnsupportedModel(format!(
            "{} (TorchScript models need the `torch` feature)",
            model_path.display()
        ))),
        _ => Err(InferenceError::UnsupportedModel(
            model_path.display().to_string(),
        )),
    }
}
