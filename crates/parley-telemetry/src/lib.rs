//! # parley-telemetry
//!
//! The one seam every pipeline node and the executor report through.
//!
//! A [`TelemetryUnit`] is a timed, attributable record of one unit of work
//! (a span, in tracing terms). Units nest: a child's lifetime is contained
//! within its parent's. The [`TelemetrySink`] trait abstracts where finished
//! units go, so the pipeline is never coupled to a concrete backend:
//!
//! - [`NoopSink`] — inert handles; telemetry disabled or under test
//! - [`LogSink`] — structured `tracing` events + `metrics` series
//! - [`RecordingSink`] — in-memory capture for test assertions
//!
//! Lifecycle rules (enforced by [`UnitHandle`]):
//!
//! - a unit is closed exactly once; the first `end` wins
//! - `set`/`fail` after `end` are silent no-ops, never panics
//! - attribute values are JSON scalars or serializable structures;
//!   anything else is coerced to its string form via [`attr`]

#![deny(unsafe_code)]

pub mod sink;
pub mod unit;

pub use sink::{LogSink, NoopSink, RecordingSink, TelemetrySink};
pub use unit::{TelemetryUnit, UnitHandle, attr};
