use chrono::{DateTime, Local};
use shared::PredictionResult;
use std::path::PathBuf;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub prediction: PredictionResult,
    pub image_path: PathBuf,
    pub generated_at: DateTime<Local>,
}

impl ReportDocument {
    pub fn new(
        prediction: PredictionResult,
        image_path: impl Into<PathBuf>,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            prediction,
            image_path: image_path.into(),
            generated_at,
        }
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
