use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ruleboard_core::timeline::TimelineError;
use ruleboard_core::StoreError;
use ruleboard_relay::RelayError;
use tokio::task::JoinError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Handler failures. The display text is the user-facing `error` field; the source
/// goes to the log only.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to read data")]
    Read(#[source] StoreError),
    #[error("Failed to save data")]
    Save(#[source] StoreError),
    #[error("Rule not found")]
    RuleNotFound(String),
    #[error("Ollama service not available. Make sure Ollama is running locally.")]
    OllamaUnavailable(#[source] RelayError),
    #[error("Invalid phase move")]
    PhaseMove(#[source] TimelineError),
    #[error("Internal Server Error")]
    Task(#[source] JoinError),
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Framing(join) => ApiError::Task(join),
            other => ApiError::OllamaUnavailable(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Read(_) | ApiError::Save(_) | ApiError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::RuleNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PhaseMove(_) => StatusCode::BAD_REQUEST,
            ApiError::OllamaUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Read(e) | ApiError::Save(e) => error!(error = %e, "{}", self),
            ApiError::RuleNotFound(id) => warn!(rule = %id, "{}", self),
            ApiError::OllamaUnavailable(e) => warn!(error = %e, "chat relay failed"),
            ApiError::PhaseMove(e) => warn!(error = %e, "{}", self),
            ApiError::Task(e) => error!(error = %e, "blocking task failed"),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
