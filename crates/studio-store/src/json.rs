//! JSON artifact format: UTF-8, a top-level array of `{label, score}`
//! objects, 2-space indentation.

use std::fs;
use std::path::{Path, PathBuf};

use studio_core::PredictionList;
use tracing::info;

use crate::StoreError;

/// Write `predictions` to `path`, replacing any existing file.
pub fn save_predictions(path: &Path, predictions: &PredictionList) -> Result<PathBuf, StoreError> {
    let json = predictions.to_json_pretty().map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write(path, &json)?;
    info!(path = %path.display(), count = predictions.len(), "saved results");
    Ok(path.to_path_buf())
}

/// Read an artifact written by [`save_predictions`].
///
/// The file is validated against the prediction schema: an empty array,
/// a missing key, or a score outside `[0, 1]` is rejected.
pub fn load_predictions(path: &Path) -> Result<PredictionList, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write free text, e.g. a model description.
pub fn save_text(path: &Path, text: &str) -> Result<PathBuf, StoreError> {
    write(path, text)?;
    Ok(path.to_path_buf())
}

fn write(path: &Path, contents: &str) -> Result<(), StoreError> {
    fs::write(path, contents).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
