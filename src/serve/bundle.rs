//! The loaded model bundle and its process-wide slot.
//!
//! A bundle is created once at startup and is read-only afterwards, so any
//! number of threads may score against it without locking.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::domain::ArtifactMetadata;
use crate::error::AppError;
use crate::features::FeatureLayout;
use crate::models::{CategoryEncoder, Scorer};

pub struct ModelArtifactBundle {
    regressor: Box<dyn Scorer>,
    encoder: Box<dyn CategoryEncoder>,
    layout: FeatureLayout,
    metadata: ArtifactMetadata,
}

impl ModelArtifactBundle {
    /// The expected feature order is taken from the regressor.
    pub fn new(
        regressor: Box<dyn Scorer>,
        encoder: Box<dyn CategoryEncoder>,
        metadata: ArtifactMetadata,
    ) -> Self {
        let layout = FeatureLayout::new(regressor.feature_names());
        Self {
            regressor,
            encoder,
            layout,
            metadata,
        }
    }

    pub fn regressor(&self) -> &dyn Scorer {
        self.regressor.as_ref()
    }

    pub fn encoder(&self) -> &dyn CategoryEncoder {
        self.encoder.as_ref()
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn expected_feature_names(&self) -> &[String] {
        self.layout.names()
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn mean_absolute_error(&self) -> f64 {
        self.metadata.mean_absolute_error
    }

    pub fn fit_quality(&self) -> f64 {
        self.metadata.fit_quality
    }

    pub fn trained_at(&self) -> &str {
        &self.metadata.trained_at
    }
}

impl fmt::Debug for ModelArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifactBundle")
            .field("expected_features", &self.layout.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

static BUNDLE: OnceLock<ModelArtifactBundle> = OnceLock::new();

/// Install `bundle` as the process-wide bundle. Fails if one is already installed.
pub fn install(bundle: ModelArtifactBundle) -> Result<&'static ModelArtifactBundle, AppError> {
    BUNDLE
        .set(bundle)
        .map_err(|_| AppError::BundleAlreadyInstalled)?;
    global()
}

/// The process-wide bundle, if it has been installed.
pub fn global() -> Result<&'static ModelArtifactBundle, AppError> {
    BUNDLE.get().ok_or(AppError::BundleNotLoaded)
}

/// Load the bundle from `dir` on first call; later calls return the same bundle.
pub fn load_global(dir: &Path) -> Result<&'static ModelArtifactBundle, AppError> {
    if let Some(bundle) = BUNDLE.get() {
        debug!("model bundle already loaded, not reloading");
        return Ok(bundle);
    }

    let bundle = super::loader::load_bundle(dir)?;
    // A concurrent loader may have won the race; either way serve the installed one.
    let _ = BUNDLE.set(bundle);
    global()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EncodedField, LinearModel, OneHotEncoder, Regressor};

    fn fixture() -> ModelArtifactBundle {
        ModelArtifactBundle::new(
            Box::new(Regressor::Linear(LinearModel {
                feature_names: vec!["creation_month".to_string(), "phase_Study".to_string()],
                intercept: 0.0,
                weights: vec![1.0, 1.0],
            })),
            Box::new(OneHotEncoder::new(vec![EncodedField {
                name: "phase".to_string(),
                categories: vec!["Study".to_string()],
            }])),
            ArtifactMetadata {
                trained_at: "2025-01-01 00:00:00".to_string(),
                mean_absolute_error: 3.0,
                fit_quality: 0.7,
                features: Vec::new(),
            },
        )
    }

    #[test]
    fn expected_features_come_from_the_regressor() {
        let bundle = fixture();
        assert_eq!(bundle.expected_feature_names(), ["creation_month", "phase_Study"]);
        assert_eq!(bundle.mean_absolute_error(), 3.0);
        assert!(format!("{bundle:?}").contains("expected_features: 2"));
    }

    #[test]
    fn install_happens_once() {
        let installed = install(fixture()).unwrap();
        assert!(std::ptr::eq(installed, global().unwrap()));
        assert!(matches!(install(fixture()), Err(AppError::BundleAlreadyInstalled)));
        assert_eq!(global().unwrap().fit_quality(), 0.7);
    }

    #[test]
    fn bundle_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModelArtifactBundle>();
    }
}
