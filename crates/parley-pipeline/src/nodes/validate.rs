//! Input validation — the first node.

use async_trait::async_trait;
use serde_json::json;

use parley_core::{ChatError, ChatResult, epoch_now};
use parley_telemetry::UnitHandle;

use crate::node::Node;
use crate::state::PipelineState;

/// Rejects empty input, otherwise records the trimmed form.
pub struct Validate;

#[async_trait]
impl Node for Validate {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn operation_type(&self) -> &'static str {
        "validation"
    }

    async fn run(&self, mut state: PipelineState, span: &UnitHandle) -> ChatResult<PipelineState> {
        let trimmed = state.user_input.trim();

        span.set("input_length", json!(state.user_input.len()));
        span.set("word_count", json!(trimmed.split_whitespace().count()));
        span.set("has_question_mark", json!(trimmed.contains('?')));

        if trimmed.is_empty() {
            return Err(ChatError::validation("User input cannot be empty"));
        }

        state.validated_input = Some(trimmed.to_owned());
        state.validation_timestamp = Some(epoch_now());
        Ok(state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    async fn run(input: &str) -> ChatResult<PipelineState> {
        Validate
            .run(PipelineState::initial(input, vec![]), &UnitHandle::noop())
            .await
    }

    #[tokio::test]
    async fn non_empty_input_is_trimmed_and_stamped() {
        let state = run("  Hello  ").await.unwrap();
        assert_eq!(state.validated_input.as_deref(), Some("Hello"));
        assert!(state.validation_timestamp.is_some());
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let err = run("").await.unwrap_err();
        assert_matches!(err, ChatError::Validation { message } if message == "User input cannot be empty");
    }

    #[tokio::test]
    async fn whitespace_only_input_is_rejected() {
        let err = run("   \t\n ").await.unwrap_err();
        assert!(err.is_expected_rejection());
    }

    #[tokio::test]
    async fn original_input_is_preserved() {
        let state = run("  Hello  ").await.unwrap();
        assert_eq!(state.user_input, "  Hello  ");
    }

    #[tokio::test]
    async fn span_data_describes_the_input() {
        let span = UnitHandle::open("Node: validate", "node_operation", None);
        let _ = Validate
            .run(PipelineState::initial("What is Rust?", vec![]), &span)
            .await
            .unwrap();
        let unit = span.close().unwrap();
        assert_eq!(unit.data["input_length"], 13);
        assert_eq!(unit.data["word_count"], 3);
        assert_eq!(unit.data["has_question_mark"], true);
    }
}
