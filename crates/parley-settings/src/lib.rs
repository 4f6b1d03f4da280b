//! # parley-settings
//!
//! Configuration management with layered sources for the Parley service.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`Settings::default()`]
//! 2. **User file** — `~/.parley/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `PARLEY_*` overrides (highest priority)
//!
//! The model-provider API key is deliberately *not* part of this schema; it
//! is read from `OPENAI_API_KEY` at startup and its absence is a fatal
//! startup error in the binary, not a settings concern.
//!
//! The global singleton is reloadable so tests (and a future reload
//! endpoint) can swap the cached value.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

/// Global settings singleton.
///
/// `RwLock<Option<Arc<Settings>>>` instead of `OnceLock` so the cached
/// value can be swapped on reload. Reads are cheap (shared lock +
/// `Arc::clone`); writes only happen on reload.
static SETTINGS: RwLock<Option<Arc<Settings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads from `~/.parley/settings.json` with env overrides;
/// if loading fails, returns compiled defaults. Returns an `Arc` so callers
/// hold a consistent snapshot even across a concurrent reload.
pub fn get_settings() -> Arc<Settings> {
    {
        let guard = SETTINGS.read();
        if let Some(s) = guard.as_ref() {
            return Arc::clone(s);
        }
    }

    let mut guard = SETTINGS.write();
    // Another thread may have initialized while we waited for the lock.
    if let Some(s) = guard.as_ref() {
        return Arc::clone(s);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            Settings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Initialize the global settings with a specific value.
///
/// Replaces any previously cached settings. Used by server startup (where
/// the path is known) and tests.
pub fn init_settings(settings: Settings) {
    let mut guard = SETTINGS.write();
    *guard = Some(Arc::new(settings));
}

/// Reload settings from a specific file path, swapping the global cache.
pub fn reload_settings_from_path(path: &Path) {
    let new = Arc::new(match load_settings_from_path(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, ?path, "failed to reload settings, falling back to defaults");
            Settings::default()
        }
    });
    let mut guard = SETTINGS.write();
    *guard = Some(new);
    tracing::info!(?path, "settings reloaded from disk");
}

/// Reset the global settings cache (test-only).
#[cfg(test)]
pub(crate) fn reset_settings() {
    let mut guard = SETTINGS.write();
    *guard = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that mutate the global SETTINGS static must hold this lock
    /// to avoid racing with each other.
    static SETTINGS_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn init_settings_sets_custom_value() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut custom = Settings::default();
        custom.server.port = 9999;
        init_settings(custom);
        assert_eq!(get_settings().server.port, 9999);
        reset_settings();
    }

    #[test]
    fn init_settings_replaces_previous() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut first = Settings::default();
        first.server.port = 1111;
        init_settings(first);
        assert_eq!(get_settings().server.port, 1111);

        let mut second = Settings::default();
        second.server.port = 2222;
        init_settings(second);
        assert_eq!(get_settings().server.port, 2222);
        reset_settings();
    }

    #[test]
    fn reload_settings_from_path_updates_cached_value() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        init_settings(Settings::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 4242}}"#).unwrap();

        reload_settings_from_path(&path);

        let updated = get_settings();
        assert_eq!(updated.server.port, 4242);
        // Deep merge preserves untouched defaults.
        assert_eq!(updated.model.model, "gpt-3.5-turbo");
        reset_settings();
    }

    #[test]
    fn reload_from_nonexistent_path_falls_back_to_defaults() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        let mut custom = Settings::default();
        custom.server.port = 7777;
        init_settings(custom);

        reload_settings_from_path(Path::new("/nonexistent/settings.json"));
        assert_eq!(get_settings().server.port, 8000);
        reset_settings();
    }

    #[test]
    fn get_settings_returns_arc_for_snapshot_isolation() {
        let _lock = SETTINGS_MUTEX.lock().unwrap();
        reset_settings();
        init_settings(Settings::default());

        let snapshot = get_settings();
        assert_eq!(snapshot.server.port, 8000);

        let mut new = Settings::default();
        new.server.port = 5555;
        init_settings(new);

        // Snapshot still sees the old value (Arc isolation).
        assert_eq!(snapshot.server.port, 8000);
        assert_eq!(get_settings().server.port, 5555);
        reset_settings();
    }
}
