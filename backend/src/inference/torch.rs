use std::path::Path;
use std::sync::Mutex;
use tch::{CModule, Device, Kind, Tensor};

use super::{Classifier, ImageTensor, InferenceError};

/// TorchScript export of the classifier. Runs on CUDA when available.
pub struct TorchClassifier {
    model: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let model = CModule::load_on_device(model_path, device).map_err(|e| {
            InferenceError::ModelLoad {
                path: model_path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        log::info!(
            "Loaded TorchScript model from {} on {:?}",
            model_path.display(),
            device
        );
        Ok(Self {
            model: Mutex::new(model),
            device,
        })
    }
}

impl Classifier for TorchClassifier {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
        let shape = input.shape().map(|d| d as i64);
        // torch models take NCHW
        let tensor = Tensor::from_slice(&input.data)
            .view(shape)
            .permute([0, 3, 1, 2])
            .to_device(self.device);

        let model = self
            .model
            .lock()
            .map_err(|_| InferenceError::ModelError("model mutex poisoned".into()))?;
        let output = tch::no_grad(|| model.forward_ts(&[tensor]))
            .map_err(|e| InferenceError::ModelError(e.to_string()))?;

        let flat = output.to_kind(Kind::Float).to_device(Device::Cpu).view([-1]);
        Vec::<f32>::try_from(&flat).map_err(|e| InferenceError::ModelError(e.to_string()))
    }
}
