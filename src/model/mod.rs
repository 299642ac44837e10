//! Model artifacts: the LSTM forward pass, the min/max scaler and window shaping.

pub mod lstm;
pub mod scaler;
pub mod window;

pub use lstm::{DenseLayer, LstmLayer, ModelArtifact, SequenceModel};
pub use scaler::MinMaxScaler;
pub use window::{fit_window, sliding_windows, train_test_split, Samples};

use crate::error::ArtifactError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Read and parse a JSON artifact.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
        path: display,
        source,
    })
}

/// Serialize and write a JSON artifact, creating parent directories.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let display = path.display().to_string();
    let io_err = |source| ArtifactError::Io {
        path: display.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let raw = serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Json {
        path: display.clone(),
        source,
    })?;
    std::fs::write(path, raw).map_err(io_err)
}
