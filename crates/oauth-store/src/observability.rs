//! Tracing setup for binaries embedding the store, plus log-safe credential
//! fingerprints used by both backends.
//!
//! The store itself only emits `tracing` events; installing a subscriber is
//! left to the host via [`init_tracing`].

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

/// Number of leading characters of a credential that may appear in logs.
const FINGERPRINT_LEN: usize = 6;

/// Installs a global fmt subscriber filtered by `logging.level`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(logging: &LoggingConfig) {
    init_tracing_with_level(&logging.level);
}

/// Installs a global fmt subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_tracing_with_level(level: &str) {
    let base_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let installed = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer())
        .try_init()
        .is_ok();
    if installed {
        let _ = LOG_RELOAD_HANDLE.set(handle);
    }
}

/// Replaces the active filter. A no-op before [`init_tracing`].
pub fn apply_logging_level(level: &str) {
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|f| {
            *f = EnvFilter::new(level);
        });
    }
}

/// Short, log-safe prefix of a code, token, or secret.
#[must_use]
pub fn fingerprint(value: &str) -> String {
    if value.chars().count() <= FINGERPRINT_LEN {
        return "***".to_string();
    }
    let prefix: String = value.chars().take(FINGERPRINT_LEN).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_hides_short_values() {
        assert_eq!(fingerprint("abc"), "***");
        assert_eq!(fingerprint(""), "***");
    }

    #[test]
    fn test_fingerprint_keeps_prefix_only() {
        let fp = fingerprint("a1b2c3d4e5f6g7");
        assert_eq!(fp, "a1b2c3...");
        assert!(!fp.contains("d4e5"));
    }

    #[test]
    fn test_init_and_reload_level() {
        init_tracing(&LoggingConfig::default());
        let handle = LOG_RELOAD_HANDLE.get().expect("reload handle installed");

        apply_logging_level("debug");
        let current = handle.with_current(ToString::to_string).unwrap();
        assert_eq!(current, "debug");

        // Repeated init keeps the first subscriber
        init_tracing_with_level("warn");
        tracing::debug!(token = %fingerprint("a1b2c3d4e5f6"), "Reloaded filter in effect");
    }
}
