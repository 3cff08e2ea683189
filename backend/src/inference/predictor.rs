use shared::{DiseaseLabel, PredictionResult};
use std::path::Path;
use std::sync::Arc;

use super::{preprocess, Classifier, InferenceError};

#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn predict_file(&self, path: &Path) -> Result<PredictionResult, InferenceError> {
        let tensor = preprocess(path)?;
        let scores = self.classifier.predict(&tensor)?;
        let result = interpret(&scores)?;
        log::info!(
            "Classified {} as {} ({:.2}%)",
            path.display(),
            result.label,
            result.confidence
        );
        Ok(result)
    }
}

/// Maps raw model scores onto a label and a percentage confidence.
pub fn interpret(scores: &[f32]) -> Result<PredictionResult, InferenceError> {
    let expected = DiseaseLabel::CLASS_ORDER.len();
    if scores.len() != expected {
        return Err(InferenceError::UnexpectedOutput {
            expected,
            actual: scores.len(),
        });
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(InferenceError::NonFiniteOutput);
    }

    // raw logits would push the confidence outside [0, 100]
    let probabilities = if scores.iter().all(|s| (0.0..=1.0).contains(s)) {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    let (index, max) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, p)| if p > best.1 { (i, p) } else { best });

    let label = DiseaseLabel::from_index(index).ok_or(InferenceError::UnexpectedOutput {
        expected,
        actual: scores.len(),
    })?;

    Ok(PredictionResult {
        label,
        confidence: round_percentage(max),
    })
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::MIN, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn round_percentage(probability: f32) -> f32 {
    let percent = f64::from(probability) * 100.0;
    ((percent * 100.0).round() / 100.0).clamp(0.0, 100.0) as f32
}
