use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ruleboard_core::{Graph, GraphStore, StoreError, ViewId};
use serde::Deserialize;
use serde_json::json;

use super::with_store;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(rename = "viewId")]
    pub view_id: Option<String>,
}

impl ViewQuery {
    /// A missing or empty parameter means root. Anything else is sanitized as given, so
    /// an id that sanitizes to nothing is a sub view of its own.
    pub fn view(&self) -> ViewId {
        match self.view_id.as_deref() {
            None | Some("") => ViewId::root(),
            Some(raw) => ViewId::sanitize(raw),
        }
    }
}

/// GET /api/architecture?viewId=
pub async fn get_view(
    State(state): State<SharedState>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, ApiError> {
    let view = query.view();
    match with_store(&state, move |store| store.load_view(&view)).await? {
        Ok(graph) => Ok(Json(graph).into_response()),
        // The client treats this as "never saved" and falls back to its default diagram.
        Err(StoreError::NotFound { .. }) => {
            Ok((StatusCode::NOT_FOUND, Json(Graph::default())).into_response())
        }
        Err(e) => Err(ApiError::Read(e)),
    }
}

/// POST|PUT /api/architecture?viewId=
pub async fn save_view(
    State(state): State<SharedState>,
    Query(query): Query<ViewQuery>,
    Json(graph): Json<Graph>,
) -> Result<impl IntoResponse, ApiError> {
    let view = query.view();
    let graph = graph.without_transient();
    with_store(&state, move |store| store.save_view(&view, &graph))
        .await?
        .map_err(ApiError::Save)?;
    Ok(Json(json!({ "success": true })))
}
