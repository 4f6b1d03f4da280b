//! The pipeline executor — composition and the single recovery boundary.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, instrument, warn};

use parley_core::constants::FALLBACK_RESPONSE;
use parley_core::{ChatError, ConversationMessage};
use parley_llm::{ModelClient, ResponseCache};
use parley_telemetry::{TelemetrySink, UnitHandle};

use crate::node::Instrumented;
use crate::nodes::{Generate, Postprocess, PrepareContext, UpdateHistory, Validate};
use crate::state::PipelineState;

/// Name of the enclosing unit for one pipeline run.
const WORKFLOW_UNIT: &str = "workflow.execution";

/// The fixed five-node chat pipeline.
///
/// Two entry points distinguish who owns the root telemetry unit:
///
/// - [`ChatPipeline::process`] — standalone mode; the executor opens (and
///   closes) its own root unit.
/// - [`ChatPipeline::process_within`] — library mode; the run nests under a
///   caller-owned unit and never opens a second root.
///
/// Either way, a node failure is caught here: the remaining nodes do not
/// run, the failure is reported to the sink, and the returned state carries
/// the stringified error, the fixed fallback response, and the *original*
/// history untouched.
pub struct ChatPipeline {
    nodes: Vec<Instrumented>,
    sink: Arc<dyn TelemetrySink>,
}

impl ChatPipeline {
    /// Build the pipeline over a model client, response cache, and sink.
    pub fn new(
        client: Arc<dyn ModelClient>,
        cache: Arc<ResponseCache>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        let nodes = vec![
            Instrumented::wrap(Validate, sink.clone()),
            Instrumented::wrap(PrepareContext, sink.clone()),
            Instrumented::wrap(Generate::new(client, cache), sink.clone()),
            Instrumented::wrap(Postprocess, sink.clone()),
            Instrumented::wrap(UpdateHistory, sink.clone()),
        ];
        Self { nodes, sink }
    }

    /// Run the pipeline, owning the root telemetry unit (standalone mode).
    #[instrument(skip_all, fields(input_len = user_input.len()))]
    pub async fn process(
        &self,
        user_input: &str,
        history: Vec<ConversationMessage>,
    ) -> PipelineState {
        let root = self.sink.begin(WORKFLOW_UNIT, WORKFLOW_UNIT);
        let state = self.run_under(&root, user_input, history).await;
        self.sink.end(&root);
        state
    }

    /// Run the pipeline nested under a caller-owned unit (library mode).
    #[instrument(skip_all, fields(input_len = user_input.len()))]
    pub async fn process_within(
        &self,
        parent: &UnitHandle,
        user_input: &str,
        history: Vec<ConversationMessage>,
    ) -> PipelineState {
        let unit = self.sink.child(parent, WORKFLOW_UNIT, WORKFLOW_UNIT);
        let state = self.run_under(&unit, user_input, history).await;
        self.sink.end(&unit);
        state
    }

    /// Node sequence plus recovery, inside an already-open unit.
    async fn run_under(
        &self,
        unit: &UnitHandle,
        user_input: &str,
        history: Vec<ConversationMessage>,
    ) -> PipelineState {
        let started = Instant::now();
        self.sink.set(unit, "user_input_length", json!(user_input.len()));
        self.sink
            .set(unit, "history_length", json!(history.len()));

        // The recovery path needs the pre-run history; nodes get a clone.
        let original_history = history.clone();
        let mut state = PipelineState::initial(user_input, history);

        let mut failure: Option<ChatError> = None;
        for node in &self.nodes {
            match node.run_within(unit, state.clone()).await {
                Ok(next) => state = next,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let status = match failure {
            None => {
                self.sink.set(unit, "execution.successful", json!(true));
                if let Some(timing) = state.token_timing {
                    self.sink.set(
                        unit,
                        "time_to_first_token_ms",
                        json!(timing.time_to_first_token_ms),
                    );
                    self.sink.set(
                        unit,
                        "time_to_last_token_ms",
                        json!(timing.time_to_last_token_ms),
                    );
                }
                debug!(
                    duration_ms = started.elapsed().as_millis() as u64,
                    "pipeline run complete"
                );
                "success"
            }
            Some(err) => {
                warn!(error = %err, error_type = err.kind(), "pipeline run failed");
                self.sink.set(unit, "execution.successful", json!(false));
                self.sink.set(unit, "error.type", json!(err.kind()));
                if err.is_expected_rejection() {
                    self.sink.set(unit, "expected_rejection", json!(true));
                } else {
                    self.sink.fail(unit, &err.to_string());
                }
                // Terminal state: error recorded, fallback response, and the
                // caller's history exactly as it came in.
                state.error = Some(err.to_string());
                state.processed_response = Some(FALLBACK_RESPONSE.to_owned());
                state.conversation_history = original_history;
                err.kind()
            }
        };

        metrics::counter!("pipeline_runs_total", "status" => status).increment(1);
        metrics::histogram!("pipeline_duration_seconds").record(started.elapsed().as_secs_f64());
        state
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
