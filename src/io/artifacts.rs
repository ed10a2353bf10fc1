//! Read/write artifact JSON files.
//!
//! An artifact directory holds three files:
//! - `model.json`    serialized regressor (`models::Regressor`)
//! - `encoder.json`  serialized one-hot encoder (`models::OneHotEncoder`)
//! - `metadata.json` error metric, fit quality, timestamp, logical features
//!
//! Writes go through a temporary file in the same directory followed by a
//! rename, so a reader never observes a half-written artifact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub const MODEL_FILE: &str = "model.json";
pub const ENCODER_FILE: &str = "encoder.json";
pub const METADATA_FILE: &str = "metadata.json";

pub const MODELS_DIR_ENV: &str = "TTC_MODELS_DIR";
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Locations of the three artifacts inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub model: PathBuf,
    pub encoder: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            model: dir.join(MODEL_FILE),
            encoder: dir.join(ENCODER_FILE),
            metadata: dir.join(METADATA_FILE),
        }
    }
}

/// Resolve the artifact directory: explicit flag, then `TTC_MODELS_DIR`, then `./models`.
///
/// `.env` is loaded once by the binary before this runs.
pub fn resolve_models_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    std::env::var_os(MODELS_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR))
}

/// Read and parse one JSON artifact.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path).map_err(|e| AppError::artifact_load(path, format!("cannot open: {e}")))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::artifact_load(path, format!("invalid JSON: {e}")))
}

/// Serialize `value` as pretty JSON and publish it at `path` atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let tmp = temp_path(path);

    let result = write_tmp(&tmp, value).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| AppError::artifact_write(path, format!("cannot publish: {e}")))
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_tmp<T: Serialize>(tmp: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(tmp).map_err(|e| AppError::artifact_write(tmp, format!("cannot create: {e}")))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| AppError::artifact_write(tmp, format!("serialization failed: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::artifact_write(tmp, format!("flush failed: {e}")))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| AppError::artifact_write(tmp, format!("sync failed: {e}")))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
