//! Health, service info, and metrics endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /info`
pub async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "service": state.service_name,
        "description": "Instrumented chat service with a five-node processing pipeline",
        "endpoints": {
            "POST /chat": "Send a chat message",
            "GET /health": "Health check",
            "GET /info": "Service information",
            "GET /api/history/{session_id}": "Fetch a session's conversation history",
            "POST /api/clear/{session_id}": "Clear a session's conversation history",
        },
        "features": [
            "Five-node chat pipeline",
            "OpenAI-compatible model integration",
            "Per-node telemetry units",
            "Token usage tracking",
            "Response caching",
            "Session conversation histories",
        ],
    }))
}

/// `GET /metrics` — Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(handle) => (StatusCode::OK, crate::metrics::render(&handle)),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed\n".to_owned(),
        ),
    }
}
