//! Tracing setup
//!
//! The subscriber is installed before configuration is read so config
//! resolution is logged. `logging.level` from the config file is applied
//! afterwards through a reloadable filter, unless `RUST_LOG` was given.

use anyhow::{Context, Result};
use tracing::{debug, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Filter level used until the config file has been read
pub const STARTUP_LEVEL: &str = "info";

/// Handle for replacing the startup filter once configuration is known
pub struct LogFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogFilter {
    /// Whether `RUST_LOG` directives are in effect
    pub fn from_env(&self) -> bool {
        self.from_env
    }

    /// Apply the configured level
    ///
    /// Returns `false` when `RUST_LOG` pinned the filter and the configured
    /// level was ignored.
    pub fn apply_config(&self, level: &str) -> Result<bool> {
        if self.from_env {
            debug!("RUST_LOG is set, ignoring configured level '{}'", level);
            return Ok(false);
        }
        let filter = EnvFilter::try_new(level)
            .with_context(|| format!("Invalid logging level '{}'", level))?;
        self.handle
            .reload(filter)
            .context("Failed to apply logging level")?;
        Ok(true)
    }
}

/// Build the reloadable filter layer
///
/// `env_directives` are the `RUST_LOG` contents, if any. Invalid directives
/// fall back to [`STARTUP_LEVEL`] and leave the filter reloadable.
pub fn filter_layer(env_directives: Option<&str>) -> (reload::Layer<EnvFilter, Registry>, LogFilter) {
    let parsed = env_directives.map(EnvFilter::try_new);
    let from_env = matches!(parsed, Some(Ok(_)));
    let filter = match parsed {
        Some(Ok(filter)) => filter,
        _ => EnvFilter::new(STARTUP_LEVEL),
    };

    let (layer, handle) = reload::Layer::new(filter);
    (layer, LogFilter { handle, from_env })
}

/// Install the global subscriber
pub fn init_tracing() -> LogFilter {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, log_filter) = filter_layer(env_directives.as_deref());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_directives.is_some() && !log_filter.from_env {
        warn!("Ignoring invalid RUST_LOG, using '{}'", STARTUP_LEVEL);
    }
    log_filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_configured_level_replaces_startup_filter() {
        let (layer, log_filter) = filter_layer(None);
        assert!(!log_filter.from_env());

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::DEBUG));

            assert!(log_filter.apply_config("debug").unwrap());
            assert!(tracing::enabled!(Level::DEBUG));
        });
    }

    #[test]
    fn test_rust_log_wins_over_configured_level() {
        let (layer, log_filter) = filter_layer(Some("warn"));
        assert!(log_filter.from_env());

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            assert!(!log_filter.apply_config("debug").unwrap());
            assert!(tracing::enabled!(Level::WARN));
            assert!(!tracing::enabled!(Level::INFO));
        });
    }

    #[test]
    fn test_invalid_rust_log_falls_back_to_startup_level() {
        let (_layer, log_filter) = filter_layer(Some("sirava=notalevel"));
        assert!(!log_filter.from_env());
    }

    #[test]
    fn test_invalid_configured_level_is_error() {
        let (_layer, log_filter) = filter_layer(None);
        assert!(log_filter.apply_config("sirava=notalevel").is_err());
    }
}
