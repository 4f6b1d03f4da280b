//! # parley-core
//!
//! Foundation types and utilities for the Parley chat pipeline.
//!
//! This crate provides the shared vocabulary that all other Parley crates
//! depend on:
//!
//! - **Messages**: [`messages::ConversationMessage`] (history entries) and
//!   [`messages::PromptMessage`] (what actually goes to the model)
//! - **Errors**: [`errors::ChatError`] taxonomy via `thiserror`
//! - **Constants**: system prompt, fallback response, context window sizes
//! - **Logging**: [`logging::init`] for tracing-subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other parley crates.

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod logging;
pub mod messages;

pub use errors::{ChatError, ChatResult};
pub use messages::{ConversationMessage, PromptMessage, Role, epoch_now};
