//! Telemetry units and their handles.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use parley_core::epoch_now;

/// Coerce a value into span-attribute form.
///
/// Serializable values become their JSON representation; anything that fails
/// to serialize falls back to its `Debug` string rather than erroring.
pub fn attr<T: Serialize + std::fmt::Debug>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{value:?}")))
}

/// A finished (or in-flight) record of one unit of work.
#[derive(Clone, Debug, Serialize)]
pub struct TelemetryUnit {
    /// Unique unit id.
    pub id: Uuid,
    /// Parent unit id, if nested.
    pub parent_id: Option<Uuid>,
    /// Nesting depth: 0 for roots.
    pub depth: u32,
    /// Span name, e.g. `"Node: validate"`.
    pub name: String,
    /// Operation tag, e.g. `"node_operation"` or `"workflow.execution"`.
    pub operation: String,
    /// Attribute data attached while the unit was open.
    pub data: BTreeMap<String, Value>,
    /// Wall-clock start, seconds since epoch.
    pub started_at: f64,
    /// Wall-clock end, unset until closed.
    pub ended_at: Option<f64>,
    /// Monotonic duration, filled in at close.
    pub duration_ms: Option<f64>,
    /// False once `fail` was called.
    pub success: bool,
    /// Error description recorded by `fail`.
    pub error: Option<String>,
}

/// Mutable state behind an open handle.
struct UnitState {
    unit: TelemetryUnit,
    started: Instant,
    closed: bool,
}

/// Handle to an open telemetry unit.
///
/// Cheap to clone; all clones refer to the same unit. Inert handles (from
/// [`UnitHandle::noop`]) swallow every operation.
#[derive(Clone)]
pub struct UnitHandle {
    inner: Option<Arc<Mutex<UnitState>>>,
}

impl UnitHandle {
    /// Open a new unit. `parent` links the unit into its enclosing one.
    #[must_use]
    pub fn open(name: &str, operation: &str, parent: Option<&UnitHandle>) -> Self {
        let (parent_id, depth) = match parent.and_then(|p| p.inner.as_ref()) {
            Some(state) => {
                let guard = state.lock();
                (Some(guard.unit.id), guard.unit.depth + 1)
            }
            None => (None, 0),
        };
        let unit = TelemetryUnit {
            id: Uuid::now_v7(),
            parent_id,
            depth,
            name: name.to_owned(),
            operation: operation.to_owned(),
            data: BTreeMap::new(),
            started_at: epoch_now(),
            ended_at: None,
            duration_ms: None,
            success: true,
            error: None,
        };
        Self {
            inner: Some(Arc::new(Mutex::new(UnitState {
                unit,
                started: Instant::now(),
                closed: false,
            }))),
        }
    }

    /// An inert handle: every operation is a no-op.
    #[must_use]
    pub fn noop() -> Self {
        Self { inner: None }
    }

    /// Whether this handle refers to a real unit.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        match &self.inner {
            Some(state) => !state.lock().closed,
            None => false,
        }
    }

    /// Attach an attribute. No-op on inert or closed handles.
    pub fn set(&self, key: &str, value: Value) {
        if let Some(state) = &self.inner {
            let mut guard = state.lock();
            if !guard.closed {
                let _ = guard.unit.data.insert(key.to_owned(), value);
            }
        }
    }

    /// Record a failure. Marks the unit unsuccessful but does not close it.
    /// No-op on inert or closed handles.
    pub fn fail(&self, error: &str) {
        if let Some(state) = &self.inner {
            let mut guard = state.lock();
            if !guard.closed {
                guard.unit.success = false;
                guard.unit.error = Some(error.to_owned());
            }
        }
    }

    /// Close the unit. Returns a snapshot on the first call only; later
    /// calls (and calls on inert handles) return `None`.
    #[must_use]
    pub fn close(&self) -> Option<TelemetryUnit> {
        let state = self.inner.as_ref()?;
        let mut guard = state.lock();
        if guard.closed {
            return None;
        }
        guard.closed = true;
        guard.unit.ended_at = Some(epoch_now());
        guard.unit.duration_ms = Some(guard.started.elapsed().as_secs_f64() * 1000.0);
        Some(guard.unit.clone())
    }
}

impl std::fmt::Debug for UnitHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Some(state) => {
                let guard = state.lock();
                f.debug_struct("UnitHandle")
                    .field("name", &guard.unit.name)
                    .field("closed", &guard.closed)
                    .finish()
            }
            None => f.write_str("UnitHandle(noop)"),
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
    fn open_unit_records_name_and_operation() {
        let handle = UnitHandle::open("Node: validate", "node_operation", None);
        let unit = handle.close().unwrap();
        assert_eq!(unit.name, "Node: validate");
        assert_eq!(unit.operation, "node_operation");
        assert_eq!(unit.depth, 0);
        assert!(unit.parent_id.is_none());
    }

    #[test]
    fn child_links_to_parent_with_incremented_depth() {
        let root = UnitHandle::open("workflow", "workflow.execution", None);
        let child = UnitHandle::open("node", "node_operation", Some(&root));

        let root_unit = root.close().unwrap();
        let child_unit = child.close().unwrap();
        assert_eq!(child_unit.parent_id, Some(root_unit.id));
        assert_eq!(child_unit.depth, 1);
    }

    #[test]
    fn set_attaches_data() {
        let handle = UnitHandle::open("n", "op", None);
        handle.set("input_length", json!(5));
        handle.set("cache_hit", json!(false));
        let unit = handle.close().unwrap();
        assert_eq!(unit.data["input_length"], 5);
        assert_eq!(unit.data["cache_hit"], false);
    }

    #[test]
    fn fail_marks_unsuccessful_without_closing() {
        let handle = UnitHandle::open("n", "op", None);
        handle.fail("boom");
        assert!(handle.is_recording());
        let unit = handle.close().unwrap();
        assert!(!unit.success);
        assert_eq!(unit.error.as_deref(), Some("boom"));
    }

    #[test]
    fn close_is_exactly_once() {
        let handle = UnitHandle::open("n", "op", None);
        assert!(handle.close().is_some());
        assert!(handle.close().is_none());
    }

    #[test]
    fn set_and_fail_after_close_are_noops() {
        let handle = UnitHandle::open("n", "op", None);
        let unit = handle.close().unwrap();
        assert!(unit.success);

        // Neither call may panic or mutate the closed unit.
        handle.set("late", json!(true));
        handle.fail("too late");
        assert!(handle.close().is_none());
        assert!(!handle.is_recording());
    }

    #[test]
    fn closed_unit_has_end_time_and_duration() {
        let handle = UnitHandle::open("n", "op", None);
        let unit = handle.close().unwrap();
        assert!(unit.ended_at.is_some());
        assert!(unit.ended_at.unwrap() >= unit.started_at);
        assert!(unit.duration_ms.unwrap() >= 0.0);
    }

    #[test]
    fn noop_handle_swallows_everything() {
        let handle = UnitHandle::noop();
        handle.set("k", json!(1));
        handle.fail("err");
        assert!(!handle.is_recording());
        assert!(handle.close().is_none());
    }

    #[test]
    fn attr_serializes_scalars() {
        assert_eq!(attr(&42), json!(42));
        assert_eq!(attr(&"text"), json!("text"));
        assert_eq!(attr(&true), json!(true));
        assert_eq!(attr(&vec![1, 2]), json!([1, 2]));
    }
}
