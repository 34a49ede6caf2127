//! HTTP-facing error taxonomy (§7): infrastructure failures surface to the
//! client with a status code and a `message` field; tool-layer failures
//! never reach here (they flow back to the LLM as `ToolResult` data).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InputInvalid(String),
    #[error("{0}")]
    StoreUnavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::InputInvalid(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::StoreUnavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
        };
        (status, Json(json!({"message": message}))).into_response()
    }
}

impl From<vps_store::StoreError> for ApiError {
    fn from(value: vps_store::StoreError) -> Self {
        ApiError::StoreUnavailable(value.to_string())
    }
}

impl From<vps_orchestrator::OrchestratorError> for ApiError {
    fn from(value: vps_orchestrator::OrchestratorError) -> Self {
        use vps_orchestrator::error::OrchestratorError as E;
        match value {
            E::TaskStore(vps_orchestrator::TaskStoreError::NotFound(id)) => ApiError::NotFound(format!("no such task: {id}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
