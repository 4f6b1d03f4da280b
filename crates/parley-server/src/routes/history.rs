//! Session history endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;
use tracing::debug;

use crate::state::AppState;

/// `GET /api/history/{session_id}`
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let history = state.store.get(&session_id);
    let message_count = history.len();
    debug!(session_id = %session_id, message_count, "history fetched");
    Json(json!({
        "session_id": session_id,
        "history": history,
        "message_count": message_count,
    }))
}

/// `POST /api/clear/{session_id}`
///
/// Clearing an unknown session still reports `cleared: true` — the end state
/// is the same either way.
pub async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let existed = state.store.clear(&session_id);
    debug!(session_id = %session_id, existed, "history cleared");
    Json(json!({
        "session_id": session_id,
        "cleared": true,
    }))
}
