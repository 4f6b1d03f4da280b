//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
#[must_use]
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across crates.

/// HTTP requests total (counter, labels: route, status).
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// HTTP request duration seconds (histogram, labels: route).
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
/// Pipeline runs total (counter, labels: status).
pub const PIPELINE_RUNS_TOTAL: &str = "pipeline_runs_total";
/// Pipeline run duration seconds (histogram).
pub const PIPELINE_DURATION_SECONDS: &str = "pipeline_duration_seconds";
/// Model provider requests total (counter, labels: provider).
pub const PROVIDER_REQUESTS_TOTAL: &str = "provider_requests_total";
/// Model provider errors total (counter, labels: provider, status).
pub const PROVIDER_ERRORS_TOTAL: &str = "provider_errors_total";
/// Response cache hits total (counter).
pub const RESPONSE_CACHE_HITS_TOTAL: &str = "response_cache_hits_total";
/// Response cache misses total (counter).
pub const RESPONSE_CACHE_MISSES_TOTAL: &str = "response_cache_misses_total";
/// Active sessions (gauge).
pub const SESSIONS_ACTIVE: &str = "sessions_active";
/// Telemetry units finished total (counter, labels: operation, success).
pub const TELEMETRY_UNITS_TOTAL: &str = "telemetry_units_total";
/// Telemetry unit duration seconds (histogram, labels: operation).
pub const TELEMETRY_UNIT_DURATION_SECONDS: &str = "telemetry_unit_duration_seconds";
