//! Parallel scoring of many records against one shared bundle.

use rayon::prelude::*;

use crate::domain::{OpportunityRecord, Prediction, Speed};
use crate::error::AppError;
use crate::serve::bundle::ModelArtifactBundle;

/// Score every record independently; output order matches input order.
pub fn predict_batch(
    bundle: &ModelArtifactBundle,
    records: &[OpportunityRecord],
) -> Vec<Result<Prediction, AppError>> {
    records.par_iter().map(|r| bundle.predict(r)).collect()
}

/// Aggregate view of a scored batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub scored: usize,
    pub failed: usize,
    pub fast: usize,
    pub medium: usize,
    pub slow: usize,
    pub mean_days: Option<f64>,
}

impl BatchSummary {
    pub fn from_results(results: &[Result<Prediction, AppError>]) -> Self {
        let mut summary = BatchSummary::default();
        let mut total = 0.0;

        for result in results {
            match result {
                Ok(p) => {
                    summary.scored += 1;
                    total += p.result.point_estimate;
                    match p.speed {
                        Speed::Fast => summary.fast += 1,
                        Speed::Medium => summary.medium += 1,
                        Speed::Slow => summary.slow += 1,
                    }
                }
                Err(_) => summary.failed += 1,
            }
        }

        if summary.scored > 0 {
            summary.mean_days = Some(total / summary.scored as f64);
        }
        summary
    }
}
