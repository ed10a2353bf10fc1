//! Error type shared by the library and the `ttc` binary.
//!
//! Every variant maps to a process exit code so `main` can stay tiny.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The exporter was invoked without one of the trained inputs.
    #[error("Missing training artifact: `{name}` was not provided.")]
    MissingTrainingArtifact { name: &'static str },

    /// A training output named on the export command line could not be read.
    #[error("Failed to read training input `{name}` from '{}': {message}", .path.display())]
    TrainingInput {
        name: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to write artifact '{}': {message}", .path.display())]
    ArtifactWrite { path: PathBuf, message: String },

    #[error("Failed to load artifact '{}': {message}", .path.display())]
    ArtifactLoad { path: PathBuf, message: String },

    /// A request was rejected before reaching the encoder.
    #[error("Invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Model produced a non-finite prediction ({0}).")]
    NonFinitePrediction(f64),

    #[error("Model bundle is already installed for this process.")]
    BundleAlreadyInstalled,

    #[error("Model bundle has not been loaded.")]
    BundleNotLoaded,

    #[error("Batch I/O error: {0}")]
    BatchIo(String),
}

impl AppError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn artifact_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn artifact_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ArtifactWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidInput { .. } => 2,
            AppError::ArtifactLoad { .. }
            | AppError::NonFinitePrediction(_)
            | AppError::BundleAlreadyInstalled
            | AppError::BundleNotLoaded => 3,
            AppError::MissingTrainingArtifact { .. }
            | AppError::TrainingInput { .. }
            | AppError::ArtifactWrite { .. } => 4,
            AppError::BatchIo(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_names_the_input() {
        let err = AppError::MissingTrainingArtifact { name: "encoder" };
        assert_eq!(err.to_string(), "Missing training artifact: `encoder` was not provided.");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn invalid_input_names_the_field() {
        let err = AppError::invalid_input("creation_month", "must be within 1..=12, got 13");
        assert_eq!(
            err.to_string(),
            "Invalid input for `creation_month`: must be within 1..=12, got 13"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn load_errors_carry_the_path() {
        let err = AppError::artifact_load("models/model.json", "No such file");
        assert!(err.to_string().contains("models/model.json"));
        assert_eq!(err.exit_code(), 3);
    }
}
