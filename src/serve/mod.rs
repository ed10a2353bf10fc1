//! Prediction service: bundle lifecycle, single and batch prediction.

pub mod batch;
pub mod bundle;
pub mod loader;
pub mod predictor;

pub use batch::{BatchSummary, predict_batch};
pub use bundle::{ModelArtifactBundle, global, install, load_global};
pub use loader::load_bundle;
pub use predictor::{feature_row, predict};
