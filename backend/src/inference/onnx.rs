use std::path::Path;
use tract_onnx::prelude::*;

use super::{Classifier, ImageTensor, InferenceError, INPUT_SIZE};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX export of the classifier, executed with tract. Expects NHWC input.
pub struct OnnxClassifier {
    plan: OnnxPlan,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let size = INPUT_SIZE as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, 3)),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoad {
                path: model_path.display().to_string(),
                reason: e.to_string(),
            })?;
        log::info!("Loaded ONNX model from {}", model_path.display());
        Ok(Self { plan })
    }

    fn run(&self, input: &ImageTensor) -> TractResult<Vec<f32>> {
        let [batch, height, width, channels] = input.shape();
        let array = tract_ndarray::Array4::from_shape_vec(
            (batch, height, width, channels),
            input.data.clone(),
        )?;
        let outputs = self.plan.run(tvec!(array.into_tensor().into()))?;
        let scores = outputs[0].to_array_view::<f32>()?;
        Ok(scores.iter().copied().collect())
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, InferenceError> {
        self.run(input)
            .map_err(|e| InferenceError::ModelError(e.to_string()))
    }
}
