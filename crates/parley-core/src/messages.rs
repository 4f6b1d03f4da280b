//! Message types shared across the pipeline.
//!
//! Two kinds of message exist:
//!
//! - [`ConversationMessage`]: a timestamped history entry owned by the
//!   conversation store. Immutable once created.
//! - [`PromptMessage`]: a role-tagged message in the ordered list sent to
//!   the model. No timestamp — the model never sees one.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human on the other end of the conversation.
    User,
    /// The model's reply.
    Assistant,
    /// A fixed instruction message (only ever the first prompt message).
    System,
}

impl Role {
    /// Stable lowercase name, matching the wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// Seconds since the Unix epoch, fractional.
///
/// History entries carry wall-clock timestamps as `f64` seconds — the
/// format the HTTP API exposes.
#[must_use]
pub fn epoch_now() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_millis()) / 1000.0
}

/// One entry in a conversation history.
///
/// Produced by the history-update node, consumed by the context-preparation
/// node of the *next* request. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Author role. Histories only ever contain `user` and `assistant`
    /// entries; anything else is dropped during context preparation.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Seconds since epoch when the entry was appended. Defaults to `0.0`
    /// when absent, so API callers may submit bare `{role, content}` pairs.
    #[serde(default)]
    pub timestamp: f64,
}

impl ConversationMessage {
    /// New user entry timestamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: epoch_now(),
        }
    }

    /// New assistant entry timestamped now.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: epoch_now(),
        }
    }
}

/// A role-tagged message in the ordered list sent to the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl PromptMessage {
    /// New system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// New user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// New assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
