use thiserror::Error;

use crate::models::{FeatureImportance, ImportanceWeights};

pub const CGM_LABEL: &str = "CGM use";
pub const TESTS_LABEL: &str = "Finger prick tests per day";
pub const HBA1C_LABEL: &str = "HbA1c";

/// Multiplier that keeps the average elicited weight at 1 on the gauge.
pub const SLIDER_SCALE: f64 = 3.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportanceError {
    #[error("feature '{0}' is missing from the importance table")]
    MissingFeature(String),
}

#[derive(Debug, Clone)]
pub struct UpdatedImportances {
    pub features: Vec<FeatureImportance>,
    /// Indices into `features` of the CGM, tests and HbA1c bars.
    pub adjusted: [usize; 3],
    pub slider_weights: ImportanceWeights,
}

fn find_feature(features: &[FeatureImportance], label: &str) -> Result<usize, ImportanceError> {
    features
        .iter()
        .position(|feature| feature.label.eq_ignore_ascii_case(label))
        .ok_or_else(|| ImportanceError::MissingFeature(label.to_string()))
}

/// Replaces the three adjustable importances with the user's weights, keeping their
/// combined share of the model's total.
pub fn apply_weights(
    features: &[FeatureImportance],
    weights: &ImportanceWeights,
) -> Result<UpdatedImportances, ImportanceError> {
    let adjusted = [
        find_feature(features, CGM_LABEL)?,
        find_feature(features, TESTS_LABEL)?,
        find_feature(features, HBA1C_LABEL)?,
    ];

    let share: f64 = adjusted.iter().map(|&index| features[index].importance).sum();
    let mut updated = features.to_vec();
    for (&index, weight) in adjusted.iter().zip(weights.as_array()) {
        updated[index].importance = weight * share;
    }

    Ok(UpdatedImportances {
        features: updated,
        adjusted,
        slider_weights: weights.scaled(SLIDER_SCALE),
    })
}
