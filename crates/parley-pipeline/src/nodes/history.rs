//! Conversation history update — the final node.

use async_trait::async_trait;
use serde_json::json;

use parley_core::{ChatResult, ConversationMessage};
use parley_telemetry::UnitHandle;

use crate::node::Node;
use crate::state::PipelineState;

/// Appends the user turn and the assistant turn to a copy of the history.
///
/// Append-only: the incoming entries are never reordered or rewritten, and
/// the incoming history itself is only replaced wholesale by the extended
/// copy.
pub struct UpdateHistory;

#[async_trait]
impl Node for UpdateHistory {
    fn name(&self) -> &'static str {
        "update_history"
    }

    fn operation_type(&self) -> &'static str {
        "state_update"
    }

    async fn run(&self, mut state: PipelineState, span: &UnitHandle) -> ChatResult<PipelineState> {
        let user_turn = ConversationMessage::user(state.validated_input()?);
        let assistant_turn = ConversationMessage::assistant(state.processed_response()?);

        let mut updated = state.conversation_history.clone();
        updated.push(user_turn);
        updated.push(assistant_turn);

        span.set("conversation_length", json!(updated.len()));

        state.conversation_history = updated;
        Ok(state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::Role;

    async fn run(history: Vec<ConversationMessage>) -> PipelineState {
        let mut state = PipelineState::initial("Hello", history);
        state.validated_input = Some("Hello".into());
        state.processed_response = Some("Hi there!".into());
        UpdateHistory.run(state, &UnitHandle::noop()).await.unwrap()
    }

    #[tokio::test]
    async fn appends_exactly_two_entries() {
        let prior = vec![
            ConversationMessage::user("earlier question"),
            ConversationMessage::assistant("earlier answer"),
        ];
        let state = run(prior.clone()).await;

        assert_eq!(state.conversation_history.len(), prior.len() + 2);
        // Prefix is byte-for-byte the input history.
        assert_eq!(&state.conversation_history[..prior.len()], &prior[..]);
    }

    #[tokio::test]
    async fn new_entries_carry_roles_and_content() {
        let state = run(vec![]).await;
        let [user, assistant] = &state.conversation_history[..] else {
            panic!("expected exactly two entries");
        };
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "Hello");
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.content, "Hi there!");
    }

    #[tokio::test]
    async fn new_entries_are_timestamped_in_order() {
        let state = run(vec![]).await;
        let user = &state.conversation_history[0];
        let assistant = &state.conversation_history[1];
        assert!(user.timestamp > 0.0);
        assert!(assistant.timestamp >= user.timestamp);
    }
}
