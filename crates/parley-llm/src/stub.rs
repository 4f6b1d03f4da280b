//! Deterministic model client for tests.
//!
//! Lives in the library (not behind `cfg(test)`) because the pipeline and
//! server crates drive their tests with it too.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use parley_core::PromptMessage;

use crate::client::{Completion, ModelClient, ModelError, ModelResult, UsageEstimate};

/// A model client that returns a fixed response (or a fixed failure) and
/// counts how many times it was called.
pub struct StubClient {
    response: String,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl StubClient {
    /// Stub that answers every call with `text`.
    #[must_use]
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Stub that fails every call with an API error carrying `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: String::new(),
            failure: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `complete` was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for StubClient {
    async fn complete(&self, messages: &[PromptMessage]) -> ModelResult<Completion> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(ModelError::Api {
                status: 500,
                message: message.clone(),
            });
        }
        Ok(Completion {
            text: self.response.clone(),
            model: "stub".into(),
            usage: UsageEstimate::from_word_counts(messages, &self.response),
        })
    }

    fn model(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn returning_stub_counts_calls() {
        let stub = StubClient::returning("Hi there!");
        assert_eq!(stub.call_count(), 0);

        let completion = stub.complete(&[PromptMessage::user("Hello")]).await.unwrap();
        assert_eq!(completion.text, "Hi there!");
        assert_eq!(stub.call_count(), 1);

        let _ = stub.complete(&[PromptMessage::user("Hello")]).await.unwrap();
        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_stub_returns_api_error() {
        let stub = StubClient::failing("model unavailable");
        let err = stub.complete(&[]).await.unwrap_err();
        assert_matches!(err, ModelError::Api { status: 500, message } if message == "model unavailable");
        assert_eq!(stub.call_count(), 1);
    }
}
