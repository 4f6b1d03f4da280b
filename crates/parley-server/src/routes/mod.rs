//! HTTP route table.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod chat;
mod health;
mod history;

pub use chat::{ChatMetadata, ChatRequest, ChatResponse};

/// Build the service router over shared state.
///
/// CORS is wide open, matching a service meant to sit behind a local
/// front-end during development.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/health", get(health::health))
        .route("/info", get(health::info))
        .route("/api/history/{session_id}", get(history::get_history))
        .route("/api/clear/{session_id}", post(history::clear_history))
        .route("/metrics", get(health::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
