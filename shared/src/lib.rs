use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Disease categories in the order the classifier emits its scores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum DiseaseLabel {
    Coccidiosis,
    Healthy,
    Newcastle,
    Salmonella,
}

impl DiseaseLabel {
    pub const CLASS_ORDER: [DiseaseLabel; 4] = [
        DiseaseLabel::Coccidiosis,
        DiseaseLabel::Healthy,
        DiseaseLabel::Newcastle,
        DiseaseLabel::Salmonella,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::CLASS_ORDER.get(index).copied()
    }

    pub fn info(&self) -> Option<DiseaseInfo> {
        match self {
            DiseaseLabel::Coccidiosis => Some(DiseaseInfo {
                symptoms: "Bloody droppings, weight loss, ruffled feathers",
                treatment: "Amprolium, Sulfa drugs",
                management: "Maintain dry litter, use medicated feed",
            }),
            DiseaseLabel::Newcastle => Some(DiseaseInfo {
                symptoms: "Coughing, sneezing, twisted neck",
                treatment: "Supportive care, antibiotics for secondary infections",
                management: "Vaccination, biosecurity measures",
            }),
            DiseaseLabel::Salmonella => Some(DiseaseInfo {
                symptoms: "Diarrhea, weakness, reduced egg production",
                treatment: "Antibiotics under veterinary guidance",
                management: "Clean water/feed, rodent control",
            }),
            DiseaseLabel::Healthy => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiseaseInfo {
    pub symptoms: &'static str,
    pub treatment: &'static str,
    pub management: &'static str,
}

/// Outcome of classifying one image. `confidence` is a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: DiseaseLabel,
    pub confidence: f32,
}
