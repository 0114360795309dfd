//! HTTP handlers, one module per resource.

pub mod architecture;
pub mod chat;
pub mod rules;
pub mod timeline;

use axum::response::IntoResponse;
use ruleboard_core::FlatFileStore;

use crate::error::ApiError;
use crate::SharedState;

/// Run `f` against the store on the blocking pool. Every store call is plain file I/O.
async fn with_store<T, F>(state: &SharedState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&FlatFileStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.store))
        .await
        .map_err(ApiError::Task)
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}
