use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by classifier operations.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("invalid feature shape: expected {expected} values, got {got}")]
    InvalidFeatureShape { expected: usize, got: usize },

    #[error("failed to load model from {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("feature schema mismatch: model expects {model}, extractor produces {extractor}")]
    SchemaMismatch { model: String, extractor: String },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
