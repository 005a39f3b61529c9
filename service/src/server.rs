//! HTTP transport.
//!
//! API endpoints:
//! - POST /predict - multipart upload, field `file` -> `{"prediction","confidence"}`
//! - GET  /health  - `{"status":"ok","schema":{..}}`

use axum::{
    extract::{
        multipart::MultipartRejection, DefaultBodyLimit, Multipart, State,
    },
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;
use voiceguard_classifier::Prediction;

use crate::{InferenceService, ServiceConfig, ServiceError, StartupError};

/// Builds the router around an already loaded service.
pub fn router(service: InferenceService, cfg: &ServiceConfig) -> Router {
    let mut app = Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(service)
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes));

    if cfg.cors.allow_any_origin {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Loads the model, then serves until ctrl-c.
///
/// A model that cannot be loaded is returned as an error before the
/// listener is bound.
pub async fn start_server(cfg: ServiceConfig) -> Result<(), StartupError> {
    let service = InferenceService::from_config(&cfg)?;
    let addr = cfg.socket_addr()?;
    let app = router(service, &cfg);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, model = %cfg.model_path.display(), "voiceguard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

async fn predict(
    State(service): State<InferenceService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, ServiceError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let data = field.bytes().await?;
            let prediction = service.predict(data).await?;
            return Ok(Json(prediction));
        }
    }
    Err(ServiceError::MissingFile)
}

async fn health(State(service): State<InferenceService>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "schema": service.schema(),
    }))
}
