//! Load and validate an artifact directory into a `ModelArtifactBundle`.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{
    ArtifactMetadata, CATEGORICAL_FIELDS, FIELD_CREATION_MONTH, FIELD_MACRO_PRODUCT, FIELD_PHASE,
    MacroProduct, Phase,
};
use crate::error::AppError;
use crate::io::artifacts::{ArtifactPaths, read_json};
use crate::models::{OneHotEncoder, Regressor, UnknownPolicy};
use crate::serve::bundle::ModelArtifactBundle;

/// Read all three artifacts from `dir`. Any missing or invalid file fails the whole load.
pub fn load_bundle(dir: &Path) -> Result<ModelArtifactBundle, AppError> {
    let paths = ArtifactPaths::new(dir);

    let regressor: Regressor = read_json(&paths.model)?;
    regressor
        .validate()
        .map_err(|e| AppError::artifact_load(&paths.model, e))?;

    let encoder: OneHotEncoder = read_json(&paths.encoder)?;
    encoder
        .validate()
        .map_err(|e| AppError::artifact_load(&paths.encoder, e))?;
    check_encoder_fields(&encoder).map_err(|e| AppError::artifact_load(&paths.encoder, e))?;
    if encoder.handle_unknown == UnknownPolicy::Error {
        warn!(
            path = %paths.encoder.display(),
            "encoder was fitted with handle_unknown=error; serving ignores unknown categories instead"
        );
    }

    let metadata: ArtifactMetadata = read_json(&paths.metadata)?;
    validate_metadata(&metadata).map_err(|e| AppError::artifact_load(&paths.metadata, e))?;

    let bundle = ModelArtifactBundle::new(Box::new(regressor), Box::new(encoder), metadata);

    let unreachable = bundle.layout().unreachable_columns(bundle.encoder());
    if !unreachable.is_empty() {
        warn!(columns = ?unreachable, "model expects columns the encoder never produces; they stay zero");
    }
    if !bundle
        .expected_feature_names()
        .iter()
        .any(|n| n == FIELD_CREATION_MONTH)
    {
        warn!("model does not use {FIELD_CREATION_MONTH}");
    }

    info!(
        dir = %paths.dir.display(),
        features = bundle.expected_feature_names().len(),
        mae = bundle.mean_absolute_error(),
        fit_quality = bundle.fit_quality(),
        trained_at = bundle.trained_at(),
        "model bundle loaded"
    );

    Ok(bundle)
}

/// Every encoder field must be a request field, and the closed-enum fields
/// must share at least one category with the values a request can carry.
fn check_encoder_fields(encoder: &OneHotEncoder) -> Result<(), String> {
    let phases: Vec<&str> = Phase::ALL.iter().map(|p| p.category()).collect();
    let macros: Vec<&str> = MacroProduct::ALL.iter().map(|m| m.category()).collect();

    for field in &encoder.fields {
        if !CATEGORICAL_FIELDS.contains(&field.name.as_str()) {
            return Err(format!(
                "encoder field '{}' is not a request field (expected one of {})",
                field.name,
                CATEGORICAL_FIELDS.join(", ")
            ));
        }

        let closed = match field.name.as_str() {
            FIELD_PHASE => &phases,
            FIELD_MACRO_PRODUCT => &macros,
            _ => continue,
        };
        let foreign: Vec<&str> = field
            .categories
            .iter()
            .map(String::as_str)
            .filter(|c| !closed.contains(c))
            .collect();
        if foreign.len() == field.categories.len() {
            return Err(format!(
                "encoder field '{}' has no category a request can match (expected {})",
                field.name,
                closed.join(", ")
            ));
        }
        if !foreign.is_empty() {
            warn!(field = %field.name, categories = ?foreign, "encoder categories no request can match");
        }
    }
    Ok(())
}

fn validate_metadata(meta: &ArtifactMetadata) -> Result<(), String> {
    if !(meta.mean_absolute_error.is_finite() && meta.mean_absolute_error >= 0.0) {
        return Err(format!(
            "mean_absolute_error must be finite and >= 0, got {}",
            meta.mean_absolute_error
        ));
    }
    if !meta.fit_quality.is_finite() {
        return Err("fit_quality must be finite".to_string());
    }
    Ok(())
}
