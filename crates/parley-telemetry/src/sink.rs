//! Sink implementations: where finished units go.

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{info, warn};

use crate::unit::{TelemetryUnit, UnitHandle};

/// Units finished total (counter, labels: operation, success).
pub const TELEMETRY_UNITS_TOTAL: &str = "telemetry_units_total";
/// Unit duration seconds (histogram, labels: operation).
pub const TELEMETRY_UNIT_DURATION_SECONDS: &str = "telemetry_unit_duration_seconds";

/// The boundary between the pipeline and any telemetry backend.
///
/// Object-safe so it can be injected as `Arc<dyn TelemetrySink>`. All
/// methods are infallible: a telemetry problem must never fail a request.
pub trait TelemetrySink: Send + Sync {
    /// Start a root unit of work.
    fn begin(&self, name: &str, operation: &str) -> UnitHandle;

    /// Start a unit nested under `parent`.
    fn child(&self, parent: &UnitHandle, name: &str, operation: &str) -> UnitHandle;

    /// Attach key/value data to an open unit. Silent no-op once ended.
    fn set(&self, handle: &UnitHandle, key: &str, value: Value) {
        handle.set(key, value);
    }

    /// Record a failure on an open unit. Silent no-op once ended.
    fn fail(&self, handle: &UnitHandle, error: &str) {
        handle.fail(error);
    }

    /// Finish the unit. The first call exports it; later calls do nothing.
    fn end(&self, handle: &UnitHandle);
}

/// Sink that records nothing. Used when telemetry is disabled and in tests
/// that don't assert on spans.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn begin(&self, _name: &str, _operation: &str) -> UnitHandle {
        UnitHandle::noop()
    }

    fn child(&self, _parent: &UnitHandle, _name: &str, _operation: &str) -> UnitHandle {
        UnitHandle::noop()
    }

    fn end(&self, _handle: &UnitHandle) {}
}

/// Sink that exports finished units as structured `tracing` events and
/// `metrics` series. This is the production backend: anything that can read
/// the process's log stream or scrape `/metrics` sees every unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn begin(&self, name: &str, operation: &str) -> UnitHandle {
        UnitHandle::open(name, operation, None)
    }

    fn child(&self, parent: &UnitHandle, name: &str, operation: &str) -> UnitHandle {
        UnitHandle::open(name, operation, Some(parent))
    }

    fn end(&self, handle: &UnitHandle) {
        let Some(unit) = handle.close() else {
            return;
        };
        export_metrics(&unit);
        let data = serde_json::to_string(&unit.data).unwrap_or_default();
        if unit.success {
            info!(
                unit = %unit.name,
                operation = %unit.operation,
                duration_ms = unit.duration_ms.unwrap_or(0.0),
                depth = unit.depth,
                data = %data,
                "telemetry unit finished"
            );
        } else {
            warn!(
                unit = %unit.name,
                operation = %unit.operation,
                duration_ms = unit.duration_ms.unwrap_or(0.0),
                error = unit.error.as_deref().unwrap_or("unknown"),
                data = %data,
                "telemetry unit failed"
            );
        }
    }
}

fn export_metrics(unit: &TelemetryUnit) {
    let operation = unit.operation.clone();
    let success = if unit.success { "true" } else { "false" };
    metrics::counter!(TELEMETRY_UNITS_TOTAL, "operation" => operation.clone(), "success" => success)
        .increment(1);
    metrics::histogram!(TELEMETRY_UNIT_DURATION_SECONDS, "operation" => operation)
        .record(unit.duration_ms.unwrap_or(0.0) / 1000.0);
}

/// Sink that keeps every finished unit in memory, for test assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    finished: Mutex<Vec<TelemetryUnit>>,
}

impl RecordingSink {
    /// New empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all finished units, in completion order.
    #[must_use]
    pub fn finished(&self) -> Vec<TelemetryUnit> {
        self.finished.lock().clone()
    }

    /// First finished unit with the given name, if any.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TelemetryUnit> {
        self.finished.lock().iter().find(|u| u.name == name).cloned()
    }

    /// Number of finished units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.finished.lock().len()
    }

    /// Whether nothing has finished yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.finished.lock().is_empty()
    }
}

impl TelemetrySink for RecordingSink {
    fn begin(&self, name: &str, operation: &str) -> UnitHandle {
        UnitHandle::open(name, operation, None)
    }

    fn child(&self, parent: &UnitHandle, name: &str, operation: &str) -> UnitHandle {
        UnitHandle::open(name, operation, Some(parent))
    }

    fn end(&self, handle: &UnitHandle) {
        if let Some(unit) = handle.close() {
            self.finished.lock().push(unit);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn noop_sink_handles_are_inert() {
        let sink = NoopSink;
        let handle = sink.begin("n", "op");
        sink.set(&handle, "k", json!(1));
        sink.fail(&handle, "err");
        sink.end(&handle);
        assert!(!handle.is_recording());
    }

    #[test]
    fn recording_sink_captures_finished_units() {
        let sink = RecordingSink::new();
        let handle = sink.begin("workflow", "workflow.execution");
        sink.set(&handle, "user_input_length", json!(5));
        sink.end(&handle);

        assert_eq!(sink.len(), 1);
        let unit = sink.find("workflow").unwrap();
        assert_eq!(unit.data["user_input_length"], 5);
        assert!(unit.success);
    }

    #[test]
    fn recording_sink_nests_children() {
        let sink = RecordingSink::new();
        let root = sink.begin("root", "workflow.execution");
        let child = sink.child(&root, "node", "node_operation");
        sink.end(&child);
        sink.end(&root);

        let units = sink.finished();
        assert_eq!(units.len(), 2);
        // Children finish before their parent.
        assert_eq!(units[0].name, "node");
        assert_eq!(units[0].parent_id, Some(units[1].id));
    }

    #[test]
    fn recording_sink_ignores_double_end() {
        let sink = RecordingSink::new();
        let handle = sink.begin("n", "op");
        sink.end(&handle);
        sink.end(&handle);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn set_after_end_does_not_mutate_recorded_unit() {
        let sink = RecordingSink::new();
        let handle = sink.begin("n", "op");
        sink.end(&handle);

        sink.set(&handle, "late", json!(true));
        sink.fail(&handle, "too late");

        let unit = sink.find("n").unwrap();
        assert!(unit.data.is_empty());
        assert!(unit.success);
    }

    #[test]
    fn failed_unit_keeps_error_description() {
        let sink = RecordingSink::new();
        let handle = sink.begin("generate", "node_operation");
        sink.fail(&handle, "generation failed: timeout");
        sink.end(&handle);

        let unit = sink.find("generate").unwrap();
        assert!(!unit.success);
        assert_eq!(unit.error.as_deref(), Some("generation failed: timeout"));
    }

    #[test]
    fn log_sink_end_is_safe_without_subscriber() {
        let sink = LogSink;
        let handle = sink.begin("n", "op");
        sink.set(&handle, "k", json!("v"));
        sink.end(&handle);
        // Double end still fine.
        sink.end(&handle);
    }
}
