//! Context preparation — builds the ordered prompt list.

use async_trait::async_trait;
use serde_json::json;

use parley_core::constants::{CONTEXT_WINDOW, SYSTEM_PROMPT};
use parley_core::{ChatResult, PromptMessage, Role};
use parley_telemetry::UnitHandle;

use crate::node::Node;
use crate::state::PipelineState;

/// Assembles `[system] + last 5 history entries + current input`.
///
/// History entries whose role is neither user nor assistant are dropped
/// before the window is applied.
pub struct PrepareContext;

#[async_trait]
impl Node for PrepareContext {
    fn name(&self) -> &'static str {
        "prepare_context"
    }

    fn operation_type(&self) -> &'static str {
        "preprocessing"
    }

    async fn run(&self, mut state: PipelineState, span: &UnitHandle) -> ChatResult<PipelineState> {
        let validated = state.validated_input()?.to_owned();

        let mut messages = vec![PromptMessage::system(SYSTEM_PROMPT)];

        let relevant: Vec<&parley_core::ConversationMessage> = state
            .conversation_history
            .iter()
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
            .collect();
        let window_start = relevant.len().saturating_sub(CONTEXT_WINDOW);
        for entry in &relevant[window_start..] {
            messages.push(PromptMessage {
                role: entry.role,
                content: entry.content.clone(),
            });
        }

        messages.push(PromptMessage::user(validated));

        span.set("context_messages_count", json!(messages.len()));
        span.set("history_length", json!(state.conversation_history.len()));

        state.messages = Some(messages);
        Ok(state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
