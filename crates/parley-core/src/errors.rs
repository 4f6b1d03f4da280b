//! Error taxonomy for the chat pipeline.
//!
//! Three classes, matching the recovery boundaries:
//!
//! - [`ChatError::Validation`] — empty/whitespace input. An expected
//!   rejection: the HTTP handler turns it into a 400 before the pipeline
//!   runs, and it never reaches the telemetry failure path.
//! - [`ChatError::Generation`] — the underlying model call failed. Recovered
//!   at the pipeline executor, which reports it to telemetry and returns a
//!   fallback state instead of crashing the request.
//! - [`ChatError::Internal`] — anything else raised by a node. Same recovery
//!   path as `Generation`.
//!
//! Nothing in the pipeline retries; retry (if any) belongs to the model
//! client's transport layer.

use thiserror::Error;

/// Result alias used throughout the pipeline crates.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors a pipeline node can raise.
#[derive(Debug, Error)]
pub enum ChatError {
    /// User input was empty or whitespace-only.
    #[error("validation failed: {message}")]
    Validation {
        /// Human-readable rejection reason.
        message: String,
    },

    /// The model call failed (timeout, API error, transport failure).
    #[error("generation failed: {message}")]
    Generation {
        /// Underlying failure description.
        message: String,
    },

    /// Unclassified node failure.
    #[error("internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

impl ChatError {
    /// Convenience constructor for validation rejections.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        ChatError::Validation {
            message: message.into(),
        }
    }

    /// Convenience constructor for generation failures.
    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        ChatError::Generation {
            message: message.into(),
        }
    }

    /// Convenience constructor for unclassified failures.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        ChatError::Internal {
            message: message.into(),
        }
    }

    /// Stable label for telemetry data and metrics (`error_type`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Validation { .. } => "validation",
            ChatError::Generation { .. } => "generation",
            ChatError::Internal { .. } => "internal",
        }
    }

    /// Whether this error is an expected rejection rather than a failure.
    ///
    /// Expected rejections are surfaced as 400s and never recorded as
    /// telemetry failures.
    #[must_use]
    pub fn is_expected_rejection(&self) -> bool {
        matches!(self, ChatError::Validation { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
