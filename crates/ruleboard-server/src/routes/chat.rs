use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use ruleboard_relay::ChatRequest;
use serde_json::json;
use tracing::warn;

use crate::error::ApiError;
use crate::SharedState;

/// POST /api/chat
///
/// Pipes the model's NDJSON reply through as it arrives. Nothing is buffered or
/// re-framed despite the event-stream content type.
pub async fn chat(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let stream = state
        .relay
        .chat(&request)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// GET /api/ollama-status
pub async fn ollama_status(State(state): State<SharedState>) -> impl IntoResponse {
    match state.relay.status().await {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "model": status.model })),
        ),
        Err(e) => {
            warn!(error = %e, base_url = state.relay.client().base_url(), "ollama status check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
        }
    }
}
