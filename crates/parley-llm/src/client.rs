//! The [`ModelClient`] trait and its result types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use parley_core::PromptMessage;

/// Result alias for model calls.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors from the model boundary.
///
/// Any of these surfaces to the pipeline as a generation failure; the
/// pipeline never retries (retry, if any, is transport-level and out of
/// scope here).
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body or a fallback description.
        message: String,
    },

    /// 429 from the API.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Error body or a fallback description.
        message: String,
    },

    /// 2xx answer whose body didn't contain a usable completion.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// What was missing or malformed.
        message: String,
    },
}

/// Token usage for one completion.
///
/// Taken from the API's `usage` block when present; otherwise estimated by
/// word count, matching what the original service reported. Either way this
/// is accounting data, not a billing source of truth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEstimate {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Sum of the two.
    pub total_tokens: u32,
}

impl UsageEstimate {
    /// Word-count fallback when the API reports no usage.
    #[must_use]
    pub fn from_word_counts(prompt: &[PromptMessage], completion: &str) -> Self {
        let prompt_tokens = prompt
            .iter()
            .map(|m| m.content.split_whitespace().count())
            .sum::<usize>() as u32;
        let completion_tokens = completion.split_whitespace().count() as u32;
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// One generated response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text, untrimmed (postprocessing trims).
    pub text: String,
    /// Which model produced it.
    pub model: String,
    /// Token accounting.
    pub usage: UsageEstimate,
}

/// The language-model boundary.
///
/// One method: an ordered list of role-tagged messages in, a completion
/// out. The call may block its task for the duration of the model response;
/// timeouts are the implementation's responsibility and surface as
/// [`ModelError`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a completion for the given message list.
    async fn complete(&self, messages: &[PromptMessage]) -> ModelResult<Completion>;

    /// Model identifier, for telemetry data.
    fn model(&self) -> &str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_estimate_counts_words() {
        let prompt = vec![
            PromptMessage::system("You are helpful."),
            PromptMessage::user("Hello there friend"),
        ];
        let usage = UsageEstimate::from_word_counts(&prompt, "Hi there!");
        assert_eq!(usage.prompt_tokens, 6);
        assert_eq!(usage.completion_tokens, 2);
        assert_eq!(usage.total_tokens, 8);
    }

    #[test]
    fn usage_estimate_empty_completion() {
        let usage = UsageEstimate::from_word_counts(&[], "");
        assert_eq!(usage.total_tokens, 0);
    }

    #[test]
    fn model_error_display() {
        let err = ModelError::Api {
            status: 500,
            message: "upstream".into(),
        };
        assert_eq!(err.to_string(), "api error (status 500): upstream");
    }
}
