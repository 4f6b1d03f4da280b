//! # parley-llm
//!
//! The model client boundary: everything the pipeline knows about talking
//! to a language model lives behind the [`ModelClient`] trait.
//!
//! - [`client::ModelClient`] — async trait: ordered prompt messages in,
//!   [`client::Completion`] out
//! - [`openai::OpenAiClient`] — reqwest implementation against an
//!   OpenAI-compatible chat-completions endpoint
//! - [`cache::ResponseCache`] — capped, insert-only memo of prior calls
//! - [`timing::TokenTiming`] — *estimated* first/last-token timing
//! - [`stub::StubClient`] — deterministic test double with call counting

#![deny(unsafe_code)]

pub mod cache;
pub mod client;
pub mod openai;
pub mod stub;
pub mod timing;

pub use cache::ResponseCache;
pub use client::{Completion, ModelClient, ModelError, ModelResult, UsageEstimate};
pub use openai::OpenAiClient;
pub use timing::TokenTiming;
