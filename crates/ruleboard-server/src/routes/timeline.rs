use axum::{extract::State, response::IntoResponse, Json};
use ruleboard_core::timeline::{self, StatusCounts};
use ruleboard_core::{FlatFileStore, TimelinePhase};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::with_store;
use crate::error::ApiError;
use crate::SharedState;

/// GET /api/timeline
pub async fn get_phases(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TimelinePhase>>, ApiError> {
    Ok(Json(with_store(&state, FlatFileStore::load_timeline).await?))
}

/// POST /api/timeline
pub async fn save_phases(
    State(state): State<SharedState>,
    Json(phases): Json<Vec<TimelinePhase>>,
) -> Result<impl IntoResponse, ApiError> {
    with_store(&state, move |store| store.save_timeline(&phases))
        .await?
        .map_err(ApiError::Save)?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/timeline/stats
pub async fn stats(State(state): State<SharedState>) -> Result<Json<StatusCounts>, ApiError> {
    let phases = with_store(&state, FlatFileStore::load_timeline).await?;
    Ok(Json(timeline::status_counts(&phases)))
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MovePhase {
    pub from: usize,
    pub to: usize,
}

/// POST /api/timeline/move
///
/// Reorders one phase and persists the result. Responds with the new order.
pub async fn move_phase(
    State(state): State<SharedState>,
    Json(req): Json<MovePhase>,
) -> Result<Json<Vec<TimelinePhase>>, ApiError> {
    let phases = with_store(&state, move |store| {
        let mut phases = store.load_timeline();
        timeline::move_phase(&mut phases, req.from, req.to).map_err(ApiError::PhaseMove)?;
        store.save_timeline(&phases).map_err(ApiError::Save)?;
        Ok::<_, ApiError>(phases)
    })
    .await??;
    info!(from = req.from, to = req.to, "timeline phase moved");
    Ok(Json(phases))
}
