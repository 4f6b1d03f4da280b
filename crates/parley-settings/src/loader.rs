//! Settings loading: defaults → file deep-merge → env overrides.

use std::env;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::Settings;

/// Default on-disk location: `~/.parley/settings.json`.
#[must_use]
pub fn settings_path() -> PathBuf {
    let home = env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(".parley").join("settings.json")
}

/// Deep-merge `overlay` onto `base`.
///
/// Objects merge recursively; any other value in the overlay replaces the
/// base value outright.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from the default path.
pub fn load_settings() -> Result<Settings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from an explicit path.
///
/// A missing file is not an error: defaults plus env overrides apply.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let defaults = serde_json::to_value(Settings::default())?;

    let merged = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        let file_value: Value = serde_json::from_str(&raw)?;
        debug!(?path, "settings file loaded");
        deep_merge(defaults, file_value)
    } else {
        debug!(?path, "no settings file, using defaults");
        defaults
    };

    let mut settings: Settings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Apply `PARLEY_*` environment overrides (highest priority).
///
/// Unparseable values are ignored rather than fatal: a bad override must
/// not take the service down.
fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(host) = env::var("PARLEY_HOST") {
        settings.server.host = host;
    }
    if let Some(port) = parse_env("PARLEY_PORT") {
        settings.server.port = port;
    }
    if let Ok(model) = env::var("PARLEY_MODEL") {
        settings.model.model = model;
    }
    if let Some(temperature) = parse_env("PARLEY_TEMPERATURE") {
        settings.model.temperature = temperature;
    }
    if let Some(timeout_ms) = parse_env("PARLEY_TIMEOUT_MS") {
        settings.model.timeout_ms = timeout_ms;
    }
    if let Ok(base_url) = env::var("PARLEY_BASE_URL") {
        settings.model.base_url = Some(base_url);
    }
    if let Ok(sink) = env::var("PARLEY_SINK") {
        match serde_json::from_value(Value::String(sink.to_lowercase())) {
            Ok(kind) => settings.telemetry.sink = kind,
            Err(_) => debug!(sink, "ignoring unknown PARLEY_SINK value"),
        }
    }
    if let Some(json_logs) = parse_env("PARLEY_JSON_LOGS") {
        settings.telemetry.json_logs = json_logs;
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
