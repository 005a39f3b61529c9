use thiserror::Error;

/// Errors returned by feature extraction.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("feature extraction failed: {0}")]
    Extraction(String),

    #[error("invalid feature config: {0}")]
    InvalidConfig(String),

    #[error("feature vector must have {expected} values, got {got}")]
    Length { expected: usize, got: usize },
}
