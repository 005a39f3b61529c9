//! Inference service for REAL/FAKE voice classification.
//!
//! One uploaded clip in, one [`Prediction`](voiceguard_classifier::Prediction) out:
//!
//! ```text
//! upload bytes -> Loader -> Waveform -> Extractor -> FeatureVector -> Classifier -> {prediction, confidence}
//! ```
//!
//! The model is loaded once by [`InferenceService::from_config`]; if that
//! fails the service does not start. Per-request failures are reported to
//! the caller as [`ServiceError`] JSON bodies and never stop the process.
//!
//! # Example
//!
//! ```rust,no_run
//! use voiceguard_service::{start_server, ServiceConfig};
//!
//! # async fn run() -> Result<(), voiceguard_service::StartupError> {
//! start_server(ServiceConfig::default()).await
//! # }
//! ```

mod config;
mod error;
mod inference;
mod server;

pub use config::{
    CorsConfig, ServiceConfig, DEFAULT_LISTEN, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MODEL_PATH,
};
pub use error::{ServiceError, StartupError};
pub use inference::{InferenceService, RequestStage};
pub use server::{router, start_server};
