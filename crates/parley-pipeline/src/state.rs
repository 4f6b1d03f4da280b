//! The state record threaded through the pipeline.
//!
//! The service this replaces threaded a dynamic string-keyed map through
//! its nodes. Here the state is a typed struct with optional fields filled
//! in strictly additively: each node only sets fields, never clears one,
//! and later nodes read earlier fields through accessors that fail loudly
//! if the ordering contract was broken.

use serde::{Deserialize, Serialize};

use parley_core::{ChatError, ChatResult, ConversationMessage, PromptMessage};
use parley_llm::{TokenTiming, UsageEstimate};

/// Word/character accounting for the processed response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Whitespace-separated word count of the trimmed response.
    pub word_count: usize,
    /// Character count of the trimmed response.
    pub character_count: usize,
}

impl ResponseMetadata {
    /// Compute metadata for a processed response.
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            character_count: text.chars().count(),
        }
    }
}

/// Evolving request state.
///
/// `user_input` and `conversation_history` are set before the first node
/// runs; everything else is owned by exactly one node:
///
/// | field | set by |
/// |-------|--------|
/// | `validated_input`, `validation_timestamp` | validate |
/// | `messages` | prepare_context |
/// | `generated_response`, `generation_timestamp`, `token_timing`, `usage`, `cache_hit` | generate |
/// | `processed_response`, `response_metadata` | postprocess |
/// | `conversation_history` (extended copy) | update_history |
/// | `error` | executor, on failure |
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// Raw request text.
    pub user_input: String,
    /// History as of the start of the request; replaced with an extended
    /// copy by the final node. Never mutated in place.
    pub conversation_history: Vec<ConversationMessage>,
    /// Trimmed input, guaranteed non-empty after validate.
    pub validated_input: Option<String>,
    /// Seconds since epoch when validation ran.
    pub validation_timestamp: Option<f64>,
    /// Ordered prompt list for the model.
    pub messages: Option<Vec<PromptMessage>>,
    /// Raw model output.
    pub generated_response: Option<String>,
    /// Seconds since epoch when generation finished.
    pub generation_timestamp: Option<f64>,
    /// Estimated first/last-token latency (zero on cache hits).
    pub token_timing: Option<TokenTiming>,
    /// Token accounting for the generation.
    pub usage: Option<UsageEstimate>,
    /// Whether the response came from the cache.
    pub cache_hit: Option<bool>,
    /// Trimmed final response.
    pub processed_response: Option<String>,
    /// Word/char counts of the processed response.
    pub response_metadata: Option<ResponseMetadata>,
    /// Stringified failure, set only by the executor's recovery path.
    pub error: Option<String>,
}

impl PipelineState {
    /// State as the executor builds it before the first node.
    #[must_use]
    pub fn initial(user_input: impl Into<String>, history: Vec<ConversationMessage>) -> Self {
        Self {
            user_input: user_input.into(),
            conversation_history: history,
            ..Self::default()
        }
    }

    /// Trimmed input. Errors if validate has not run.
    pub fn validated_input(&self) -> ChatResult<&str> {
        self.validated_input
            .as_deref()
            .ok_or_else(|| ChatError::internal("validated_input missing: validate has not run"))
    }

    /// Prompt list. Errors if prepare_context has not run.
    pub fn messages(&self) -> ChatResult<&[PromptMessage]> {
        self.messages
            .as_deref()
            .ok_or_else(|| ChatError::internal("messages missing: prepare_context has not run"))
    }

    /// Raw model output. Errors if generate has not run.
    pub fn generated_response(&self) -> ChatResult<&str> {
        self.generated_response
            .as_deref()
            .ok_or_else(|| ChatError::internal("generated_response missing: generate has not run"))
    }

    /// Trimmed final response. Errors if postprocess has not run.
    pub fn processed_response(&self) -> ChatResult<&str> {
        self.processed_response
            .as_deref()
            .ok_or_else(|| ChatError::internal("processed_response missing: postprocess has not run"))
    }

    /// Whether the run ended in the recovery path.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
