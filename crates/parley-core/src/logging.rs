//! Tracing subscriber setup.
//!
//! One call at binary startup wires `tracing` output for every crate.
//! `RUST_LOG` controls filtering; the default keeps parley crates at `info`
//! and everything else at `warn`.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn,parley=info,parley_core=info,parley_telemetry=info,\
parley_llm=info,parley_pipeline=info,parley_server=info,parley_settings=info";

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local development.
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Install the global tracing subscriber.
///
/// Idempotent-ish: a second call returns quietly instead of panicking, so
/// tests that share a process can call it freely.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
