//! Settings schema and compiled defaults.

use serde::{Deserialize, Serialize};

/// Which telemetry sink the service wires up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Structured tracing events + metrics series.
    #[default]
    Log,
    /// Telemetry disabled.
    None,
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

/// Model provider settings. The API key itself is env-only
/// (`OPENAI_API_KEY`) and deliberately absent from this file-backed schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Model name sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Override of the API base URL (tests, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            timeout_ms: 30_000,
            base_url: None,
        }
    }
}

/// Telemetry settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetrySettings {
    /// Which sink to install.
    pub sink: SinkKind,
    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,
}

/// Root settings document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Schema version.
    pub version: String,
    /// Service name, used in health/info payloads.
    pub name: String,
    /// HTTP server section.
    pub server: ServerSettings,
    /// Model provider section.
    pub model: ModelSettings,
    /// Telemetry section.
    pub telemetry: TelemetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "0.1.0".into(),
            name: "parley".into(),
            server: ServerSettings::default(),
            model: ModelSettings::default(),
            telemetry: TelemetrySettings::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
