//! Ruleboard HTTP backend: flat-file diagram views, the rules catalog, the project
//! timeline and a chat relay to a local Ollama server.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use ruleboard_core::FlatFileStore;
use ruleboard_relay::Relay;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Immutable per-process state. Everything mutable lives in the data directory.
pub struct AppState {
    pub store: FlatFileStore,
    pub relay: Relay,
    pub static_dir: Option<PathBuf>,
}

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health))
        .route(
            "/api/architecture",
            get(routes::architecture::get_view)
                .post(routes::architecture::save_view)
                .put(routes::architecture::save_view),
        )
        .route(
            "/api/rules",
            get(routes::rules::list).post(routes::rules::replace_all),
        )
        .route("/api/rules/stats", get(routes::rules::stats))
        .route("/api/rules/:id", put(routes::rules::update_one))
        .route(
            "/api/timeline",
            get(routes::timeline::get_phases).post(routes::timeline::save_phases),
        )
        .route("/api/timeline/stats", get(routes::timeline::stats))
        .route("/api/timeline/move", post(routes::timeline::move_phase))
        .route("/api/chat", post(routes::chat::chat))
        .route("/api/ollama-status", get(routes::chat::ollama_status));

    let app = match &state.static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
