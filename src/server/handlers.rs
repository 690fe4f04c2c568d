//! Request handlers: `POST /predict`, `GET /health`.

use super::error::{ApiError, ApiResult};
use crate::pipeline::{ArtifactInfo, PredictionResult, ServiceState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifacts: Option<ArtifactInfo>,
}

/// Classify one URL
pub async fn predict(
    State(state): State<ServiceState>,
    Json(req): Json<UrlRequest>,
) -> ApiResult<Json<PredictionResult>> {
    // Fail fast before touching the blocking pool
    let pipeline = state.pipeline()?.clone();
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);

    let url = req.url;
    let result = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        pipeline.infer(&url)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("prediction task failed: {e}")))??;

    Ok(Json(result))
}

pub async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    let (load_error, artifacts) = match &state {
        ServiceState::Ready(p) => (None, p.info().cloned()),
        ServiceState::Unavailable { reason } => (Some(reason.clone()), None),
    };
    Json(HealthResponse {
        status: if state.is_ready() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.is_ready(),
        load_error,
        artifacts,
    })
}
