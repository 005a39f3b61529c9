use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use voiceguard_audio::AudioError;
use voiceguard_classifier::ClassifierError;
use voiceguard_features::FeatureError;

/// Per-request failure. Every variant becomes a JSON error response; none
/// of them stops the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing upload field `file`")]
    MissingFile,

    #[error("invalid upload: {reason}")]
    Upload { status: StatusCode, reason: String },

    #[error("{0}")]
    Decode(AudioError),

    #[error("{0}")]
    Extraction(#[from] FeatureError),

    #[error("{0}")]
    InvalidFeatureShape(ClassifierError),

    /// Failures on our side (spool I/O, worker panics). The detail is
    /// logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MissingFile | ServiceError::Decode(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upload { status, .. } => *status,
            ServiceError::Extraction(_) | ServiceError::InvalidFeatureShape(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Reason string sent to the client.
    pub fn reason(&self) -> String {
        match self {
            ServiceError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<AudioError> for ServiceError {
    fn from(e: AudioError) -> Self {
        if e.is_invalid_input() {
            ServiceError::Decode(e)
        } else {
            ServiceError::Internal(e.to_string())
        }
    }
}

impl From<ClassifierError> for ServiceError {
    fn from(e: ClassifierError) -> Self {
        match e {
            e @ ClassifierError::InvalidFeatureShape { .. } => ServiceError::InvalidFeatureShape(e),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for ServiceError {
    fn from(e: MultipartError) -> Self {
        ServiceError::Upload {
            status: e.status(),
            reason: e.body_text(),
        }
    }
}

impl From<MultipartRejection> for ServiceError {
    fn from(e: MultipartRejection) -> Self {
        ServiceError::Upload {
            status: e.status(),
            reason: e.body_text(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.reason() }))).into_response()
    }
}

/// Failure that prevents the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] ClassifierError),

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ServiceError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::from(AudioError::Empty).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::from(FeatureError::Extraction("input is silent".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::from(ClassifierError::InvalidFeatureShape { expected: 42, got: 3 })
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            ServiceError::from(AudioError::Io(io)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ServiceError::Internal("/var/spool: permission denied".into());
        assert_eq!(err.reason(), "internal error");
        let err = ServiceError::from(AudioError::Decode("not a RIFF file".into()));
        assert!(err.reason().contains("not a RIFF file"));
    }
}
