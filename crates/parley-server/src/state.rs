//! Shared handler state.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use parley_pipeline::ChatPipeline;
use parley_telemetry::TelemetrySink;

use crate::store::ConversationStore;

/// Everything the HTTP handlers need, cloned per request.
///
/// All fields are `Arc`-shared; cloning the state is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The chat pipeline, shared across requests.
    pub pipeline: Arc<ChatPipeline>,
    /// Session-keyed conversation histories.
    pub store: Arc<ConversationStore>,
    /// Sink that receives per-request telemetry units.
    pub sink: Arc<dyn TelemetrySink>,
    /// Service name reported by `/health` and `/info`.
    pub service_name: String,
    /// Handle for rendering `/metrics`; `None` when no recorder is installed
    /// (tests, embedded use).
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State without a metrics recorder.
    #[must_use]
    pub fn new(
        pipeline: Arc<ChatPipeline>,
        store: Arc<ConversationStore>,
        sink: Arc<dyn TelemetrySink>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            store,
            sink,
            service_name: service_name.into(),
            metrics: None,
        }
    }

    /// Attach a metrics handle for the `/metrics` route.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_name", &self.service_name)
            .field("sessions", &self.store.session_count())
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
