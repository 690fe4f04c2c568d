//! HTTP error mapping for the request boundary.

use crate::error::InferenceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Artifacts failed to load at start-up
    ModelNotLoaded,
    /// Extraction, scaling or prediction failed; carries the underlying message
    Internal(String),
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Unavailable(_) => ApiError::ModelNotLoaded,
            InferenceError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::ModelNotLoaded => (StatusCode::SERVICE_UNAVAILABLE, "Model not loaded".to_string()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "prediction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
