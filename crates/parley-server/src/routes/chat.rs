//! The chat endpoint.
//!
//! The handler owns the request-level telemetry unit; the pipeline run nests
//! under it. Malformed requests are rejected here, before the pipeline runs,
//! so a bad request never shows up as a pipeline failure.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use parley_core::constants::DEFAULT_SESSION;
use parley_core::ConversationMessage;
use parley_llm::TokenTiming;
use parley_pipeline::ResponseMetadata;

use crate::state::AppState;

/// `POST /chat` request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Session whose stored history seeds the conversation. Defaults to
    /// `"default"`.
    pub session_id: Option<String>,
    /// Explicit history; when present it wins over the stored one.
    pub conversation_history: Option<Vec<ConversationMessage>>,
}

/// Metadata block of a successful `POST /chat` response.
#[derive(Debug, Serialize)]
pub struct ChatMetadata {
    /// Whether every pipeline node ran.
    pub workflow_completed: bool,
    /// Estimated token timing for the generation step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_timing: Option<TokenTiming>,
    /// Word and character counts of the final response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<ResponseMetadata>,
}

/// Successful `POST /chat` response body.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Always `true` on this shape; failures use the error shape.
    pub success: bool,
    /// The assistant's reply.
    pub response: String,
    /// Full updated history, including the new user/assistant pair.
    pub conversation_history: Vec<ConversationMessage>,
    /// Run metadata.
    pub metadata: ChatMetadata,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message, "success": false })),
    )
        .into_response()
}

/// `POST /chat`
#[instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();

    let Ok(Json(request)) = payload else {
        return bad_request("Invalid JSON in request body");
    };
    if request.message.trim().is_empty() {
        return bad_request("Message cannot be empty");
    }

    let session_id = request
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION.to_owned());
    let history = match request.conversation_history {
        Some(history) => history,
        None => state.store.get(&session_id),
    };

    let unit = state.sink.begin("http.request", "http.server");
    state
        .sink
        .set(&unit, "user_input_length", json!(request.message.len()));
    state
        .sink
        .set(&unit, "conversation_history_length", json!(history.len()));
    state.sink.set(&unit, "session_id", json!(session_id));
    state.sink.set(&unit, "http.route", json!("/chat"));

    let result = state
        .pipeline
        .process_within(&unit, &request.message, history)
        .await;

    let response = if result.is_error() {
        let error = result
            .error
            .clone()
            .unwrap_or_else(|| "unknown error".to_owned());
        warn!(error = %error, session_id = %session_id, "chat request failed");
        state.sink.set(&unit, "response_success", json!(false));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": error,
                "success": false,
                "response": result.processed_response,
                "conversation_history": result.conversation_history,
                "metadata": { "workflow_completed": false, "error": error },
            })),
        )
            .into_response()
    } else {
        let text = result.processed_response.clone().unwrap_or_default();
        state.sink.set(&unit, "response_success", json!(true));
        state.sink.set(&unit, "response_length", json!(text.len()));
        state.store.put(&session_id, result.conversation_history.clone());
        info!(
            session_id = %session_id,
            response_length = text.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "chat request complete"
        );
        Json(ChatResponse {
            success: true,
            response: text,
            conversation_history: result.conversation_history,
            metadata: ChatMetadata {
                workflow_completed: true,
                token_timing: result.token_timing,
                response_metadata: result.response_metadata,
            },
        })
        .into_response()
    };

    state.sink.end(&unit);
    let status = response.status().as_u16().to_string();
    metrics::counter!("http_requests_total", "route" => "/chat", "status" => status)
        .increment(1);
    metrics::histogram!("http_request_duration_seconds", "route" => "/chat")
        .record(started.elapsed().as_secs_f64());
    response
}
