//! # parley-pipeline
//!
//! The chat workflow: five nodes in a fixed total order,
//!
//! ```text
//! validate → prepare_context → generate → postprocess → update_history
//! ```
//!
//! threaded through a strictly additive [`state::PipelineState`]. No
//! branching, no retries, no parallelism among nodes — the interesting part
//! is the telemetry contract, not the control flow.
//!
//! Each node is wrapped by [`node::Instrumented`], which opens a nested
//! telemetry unit around the node body. [`executor::ChatPipeline`] composes
//! the five wrapped nodes, owns the enclosing unit, and is the single
//! recovery boundary: a failed node ends the run and yields a terminal
//! state carrying the error and a fixed fallback response.

#![deny(unsafe_code)]

pub mod executor;
pub mod node;
pub mod nodes;
pub mod state;

pub use executor::ChatPipeline;
pub use node::{Instrumented, Node};
pub use state::{PipelineState, ResponseMetadata};
