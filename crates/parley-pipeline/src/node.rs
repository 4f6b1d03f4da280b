//! The [`Node`] trait and the [`Instrumented`] wrapper.
//!
//! Telemetry is attached by explicit composition: [`Instrumented::wrap`]
//! takes a node and a sink and returns a wrapped node that opens a nested
//! unit around every run. Node bodies stay free of begin/end bookkeeping;
//! they receive their own open unit to attach data to.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use parley_core::ChatResult;
use parley_telemetry::{TelemetrySink, UnitHandle};

use crate::state::PipelineState;

/// Operation tag shared by every node unit, matching the original wire data.
pub const NODE_OPERATION: &str = "node_operation";

/// One discrete, ordered transformation step over the request state.
#[async_trait]
pub trait Node: Send + Sync {
    /// Stable node name, e.g. `"validate"`.
    fn name(&self) -> &'static str;

    /// Coarse operation category for telemetry, e.g. `"validation"`.
    fn operation_type(&self) -> &'static str;

    /// Transform the state. `span` is the node's own open telemetry unit;
    /// the wrapper owns its lifecycle, the node only attaches data.
    async fn run(&self, state: PipelineState, span: &UnitHandle) -> ChatResult<PipelineState>;
}

/// A node with telemetry wrapped around it.
pub struct Instrumented {
    inner: Box<dyn Node>,
    sink: Arc<dyn TelemetrySink>,
}

impl Instrumented {
    /// Wrap a node with a telemetry sink.
    pub fn wrap(node: impl Node + 'static, sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            inner: Box::new(node),
            sink,
        }
    }

    /// Node name (for executor logging).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Run the node inside a unit nested under `parent`.
    ///
    /// The unit is always ended, on success and on failure. A validation
    /// rejection is expected behavior: the unit records it as data instead
    /// of a failure, so only genuine faults show up as failed units.
    pub async fn run_within(
        &self,
        parent: &UnitHandle,
        state: PipelineState,
    ) -> ChatResult<PipelineState> {
        let span = self.sink.child(
            parent,
            &format!("Node: {}", self.inner.name()),
            NODE_OPERATION,
        );
        self.sink.set(&span, "node.name", json!(self.inner.name()));
        self.sink
            .set(&span, "node.operation_type", json!(self.inner.operation_type()));

        let result = self.inner.run(state, &span).await;
        match &result {
            Ok(_) => {
                self.sink.set(&span, "execution.successful", json!(true));
            }
            Err(err) => {
                self.sink.set(&span, "execution.successful", json!(false));
                self.sink.set(&span, "error.type", json!(err.kind()));
                if err.is_expected_rejection() {
                    self.sink.set(&span, "expected_rejection", json!(true));
                } else {
                    self.sink.fail(&span, &err.to_string());
                }
            }
        }
        self.sink.end(&span);
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
