//! Single-request prediction against a loaded bundle.
//!
//! Pipeline: validate -> encode -> align -> score -> clamp -> interval -> labels.
//! Pure function of the request and the bundle; nothing is mutated.

use crate::domain::{Confidence, OpportunityRecord, Prediction, PredictionResult, Speed};
use crate::error::AppError;
use crate::features::encode_record;
use crate::serve::bundle::ModelArtifactBundle;

/// Aligned feature row for `record`, in `bundle.expected_feature_names()` order.
pub fn feature_row(bundle: &ModelArtifactBundle, record: &OpportunityRecord) -> Result<Vec<f64>, AppError> {
    record.validate()?;
    let encoded = encode_record(bundle.encoder(), record);
    Ok(bundle.layout().align(&encoded))
}

/// Score one record and derive the interval and presentation labels.
pub fn predict(bundle: &ModelArtifactBundle, record: &OpportunityRecord) -> Result<Prediction, AppError> {
    let row = feature_row(bundle, record)?;

    let raw = bundle.regressor().score(&row);
    if !raw.is_finite() {
        return Err(AppError::NonFinitePrediction(raw));
    }

    let result = PredictionResult::from_raw(raw, bundle.mean_absolute_error());
    Ok(Prediction {
        record: record.clone(),
        result,
        speed: Speed::classify(result.point_estimate),
        confidence: Confidence::from_fit_quality(bundle.fit_quality()),
        fit_quality: bundle.fit_quality(),
    })
}

impl ModelArtifactBundle {
    pub fn predict(&self, record: &OpportunityRecord) -> Result<Prediction, AppError> {
        predict(self, record)
    }
}
