use std::sync::Arc;

use crate::config::Settings;
use crate::inference::{Classifier, Predictor};
use crate::report::ReportGenerator;
use crate::storage::UploadStore;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub uploads: UploadStore,
    pub predictor: Predictor,
    pub reports: ReportGenerator,
}

impl AppState {
    pub fn new(settings: Settings, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            uploads: UploadStore::new(settings.upload_dir.clone()),
            predictor: Predictor::new(classifier),
            reports: ReportGenerator::new(),
            settings,
        }
    }
}
