//! # parley-server
//!
//! HTTP surface over the chat pipeline:
//!
//! - `POST /chat` — run one pipeline pass
//! - `GET /health`, `GET /info` — service status and description
//! - `GET /api/history/{session_id}`, `POST /api/clear/{session_id}` —
//!   session-scoped conversation history
//! - `GET /metrics` — Prometheus text
//!
//! The handler layer is the outer recovery boundary: malformed bodies and
//! empty messages are rejected with a 400 before the pipeline executor is
//! ever invoked; executor-recovered failures map to a 500 with the fixed
//! fallback response in the body.

#![deny(unsafe_code)]

pub mod metrics;
pub mod routes;
pub mod state;
pub mod store;

pub use routes::router;
pub use state::AppState;
pub use store::ConversationStore;
