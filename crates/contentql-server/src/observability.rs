//! Tracing setup.
//!
//! The subscriber is installed before the configuration is read, with a
//! filter that can be swapped once `logging.level` is known.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

static LOG_FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Installs the global subscriber, filtering at `level` unless `RUST_LOG`
/// holds a valid directive. Later calls keep the first subscriber.
pub fn init_tracing_with_level(level: &str) {
    let filter = rust_log_filter().unwrap_or_else(|| EnvFilter::new(level));
    let (filter_layer, handle) = reload::Layer::new(filter);
    if LOG_FILTER.set(handle).is_err() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer())
        .try_init();
}

fn rust_log_filter() -> Option<EnvFilter> {
    std::env::var_os("RUST_LOG")?;
    EnvFilter::try_from_default_env().ok()
}

/// Switches the filter to `level`. Returns `false` when nothing changed:
/// tracing is not initialized yet, or `RUST_LOG` overrides the config.
pub fn apply_logging_level(level: &str) -> bool {
    if rust_log_filter().is_some() {
        return false;
    }
    let Some(handle) = LOG_FILTER.get() else {
        return false;
    };
    let applied = handle.modify(|filter| *filter = EnvFilter::new(level)).is_ok();
    if applied {
        tracing::debug!(level, "Log level applied");
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_before_init_is_a_noop() {
        if LOG_FILTER.get().is_none() {
            assert!(!apply_logging_level("debug"));
        }
    }
}
