//! Shared serving workflow used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core flow:
//! resolve artifacts -> load bundle once -> validate -> predict
//!
//! The handlers in `app` can then focus on presentation.

use std::path::Path;

use tracing::warn;

use crate::domain::{OpportunityRecord, Prediction, ServeConfig};
use crate::error::AppError;
use crate::io::ingest::{IngestedRecords, load_records_csv};
use crate::serve::{BatchSummary, ModelArtifactBundle, load_global, predict_batch};

/// All computed outputs of a single `ttc batch` run.
#[derive(Debug)]
pub struct BatchRun {
    pub ingest: IngestedRecords,
    pub predictions: Vec<Prediction>,
    /// Input CSV line of each entry in `predictions`.
    pub lines: Vec<usize>,
    pub summary: BatchSummary,
}

/// Load (or reuse) the process-wide bundle for `config`.
pub fn bundle(config: &ServeConfig) -> Result<&'static ModelArtifactBundle, AppError> {
    load_global(&config.models_dir)
}

/// Predict a single record.
pub fn run_predict(config: &ServeConfig, record: &OpportunityRecord) -> Result<Prediction, AppError> {
    // Reject bad input before paying for the artifact load.
    record.validate()?;
    bundle(config)?.predict(record)
}

/// Ingest a CSV file and score every valid row in parallel.
pub fn run_batch(config: &ServeConfig, input: &Path) -> Result<BatchRun, AppError> {
    let ingest = load_records_csv(input)?;
    let bundle = bundle(config)?;
    Ok(score_ingested(bundle, ingest))
}

/// Score already-ingested records against `bundle`.
pub fn score_ingested(bundle: &ModelArtifactBundle, ingest: IngestedRecords) -> BatchRun {
    let results = predict_batch(bundle, &ingest.records);
    let summary = BatchSummary::from_results(&results);

    let mut predictions = Vec::with_capacity(results.len());
    let mut lines = Vec::with_capacity(results.len());
    for (line, result) in ingest.lines.iter().zip(results) {
        match result {
            Ok(p) => {
                predictions.push(p);
                lines.push(*line);
            }
            Err(e) => warn!(line, error = %e, "row could not be scored"),
        }
    }

    BatchRun {
        ingest,
        predictions,
        lines,
        summary,
    }
}
