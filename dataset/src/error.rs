use std::path::PathBuf;

use thiserror::Error;

/// Errors returned while assembling a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read class directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
