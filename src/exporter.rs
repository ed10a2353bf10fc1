//! Artifact exporter: publish a trained model, its encoder and metadata.
//!
//! Runs once per training cycle. Every input is checked before anything is
//! written, and the metadata file is published last.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::domain::{ArtifactMetadata, LOGICAL_FEATURES};
use crate::error::AppError;
use crate::io::artifacts::{ArtifactPaths, read_json, write_json_atomic};
use crate::models::{OneHotEncoder, Regressor};

/// Format of `trained_at` in the metadata file.
pub const TRAINED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outputs handed over by the training process. Any of them may be absent.
#[derive(Debug, Clone, Default)]
pub struct TrainingOutputs {
    pub regressor: Option<Regressor>,
    pub encoder: Option<OneHotEncoder>,
    pub mean_absolute_error: Option<f64>,
    pub fit_quality: Option<f64>,
}

/// Where the artifacts were published, and the metadata written.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub paths: ArtifactPaths,
    pub metadata: ArtifactMetadata,
}

impl ExportReport {
    pub fn files(&self) -> [&PathBuf; 3] {
        [&self.paths.model, &self.paths.encoder, &self.paths.metadata]
    }
}

/// Read one training output (`name` is `regressor` or `encoder`) from a JSON file.
pub fn read_training_input<T: DeserializeOwned>(name: &'static str, path: &Path) -> Result<T, AppError> {
    read_json(path).map_err(|e| match e {
        AppError::ArtifactLoad { path, message } => AppError::TrainingInput { name, path, message },
        other => other,
    })
}

/// Export all artifacts into `dest`, stamped with the current local time.
pub fn export_artifacts(dest: &Path, outputs: TrainingOutputs) -> Result<ExportReport, AppError> {
    export_artifacts_at(dest, outputs, Local::now())
}

/// Export all artifacts into `dest` with an explicit training timestamp.
pub fn export_artifacts_at<Tz>(
    dest: &Path,
    outputs: TrainingOutputs,
    trained_at: DateTime<Tz>,
) -> Result<ExportReport, AppError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let regressor = outputs
        .regressor
        .ok_or(AppError::MissingTrainingArtifact { name: "regressor" })?;
    let encoder = outputs
        .encoder
        .ok_or(AppError::MissingTrainingArtifact { name: "encoder" })?;
    let mae = outputs
        .mean_absolute_error
        .ok_or(AppError::MissingTrainingArtifact {
            name: "mean_absolute_error",
        })?;
    let fit_quality = outputs
        .fit_quality
        .ok_or(AppError::MissingTrainingArtifact { name: "fit_quality" })?;

    if !(mae.is_finite() && mae >= 0.0) {
        return Err(AppError::invalid_input(
            "mean_absolute_error",
            format!("must be finite and >= 0, got {mae}"),
        ));
    }
    if !fit_quality.is_finite() {
        return Err(AppError::invalid_input("fit_quality", "must be finite"));
    }
    regressor
        .validate()
        .map_err(|e| AppError::invalid_input("regressor", e))?;
    encoder
        .validate()
        .map_err(|e| AppError::invalid_input("encoder", e))?;

    create_dir_all(dest).map_err(|e| AppError::artifact_write(dest, format!("cannot create directory: {e}")))?;
    let paths = ArtifactPaths::new(dest);

    write_json_atomic(&paths.model, &regressor)?;
    info!(path = %paths.model.display(), kind = regressor.kind_name(), "model saved");

    write_json_atomic(&paths.encoder, &encoder)?;
    info!(path = %paths.encoder.display(), fields = encoder.fields.len(), "encoder saved");

    let metadata = ArtifactMetadata {
        trained_at: trained_at.format(TRAINED_AT_FORMAT).to_string(),
        mean_absolute_error: mae,
        fit_quality,
        features: LOGICAL_FEATURES.iter().map(|f| f.to_string()).collect(),
    };
    write_json_atomic(&paths.metadata, &metadata)?;
    info!(path = %paths.metadata.display(), "metadata saved");

    Ok(ExportReport { paths, metadata })
}
