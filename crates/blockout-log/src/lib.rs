//! Structured logging for Blockout.
//!
//! Installs a `tracing` subscriber with an environment-aware filter and a
//! human-readable console layer on stderr, so stdout stays free for reports.
//! Debug builds can additionally write JSON lines to a log file for
//! post-mortem analysis.

use std::path::{Path, PathBuf};

use blockout_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config provide one.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "blockout.log";

/// Initialize the global tracing subscriber.
///
/// - `RUST_LOG` wins if set; otherwise the config's `debug.log_level`, then
///   [`DEFAULT_FILTER`].
/// - Console output goes to stderr with uptime timestamps and targets.
/// - With `debug_build` and a configured `debug.log_dir`, JSON lines are also
///   written to [`LOG_FILE_NAME`] in that directory.
///
/// Calling it twice is harmless: the second subscriber is dropped.
///
/// # Examples
///
/// ```no_run
/// use blockout_config::Config;
/// use blockout_log::init_logging;
///
/// init_logging(Some(&Config::default()), cfg!(debug_assertions));
/// ```
pub fn init_logging(config: Option<&Config>, debug_build: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = config.and_then(|c| c.debug.log_dir.as_deref())
        && let Some(log_file) = create_log_file(log_dir)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        let _ = subscriber.with(file_layer).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

/// Filter directives derived from the config, falling back to [`DEFAULT_FILTER`].
pub fn filter_directives(config: Option<&Config>) -> String {
    config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Path of the JSON log file inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

fn create_log_file(log_dir: &Path) -> Option<std::fs::File> {
    std::fs::create_dir_all(log_dir).ok()?;
    std::fs::File::create(log_file_path(log_dir)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_without_config() {
        assert_eq!(filter_directives(None), "info");
    }

    #[test]
    fn test_filter_from_config() {
        let mut config = Config::default();
        config.debug.log_level = "warn,blockout_materials=debug".to_string();
        assert_eq!(filter_directives(Some(&config)), "warn,blockout_materials=debug");
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filter_parses() {
        for directives in [
            "info",
            "debug,blockout_materials=trace",
            "warn,blockout_materials::policy=debug",
            "error",
        ] {
            assert!(
                EnvFilter::try_new(directives).is_ok(),
                "failed to parse filter: {directives}"
            );
        }
    }

    #[test]
    fn test_log_file_created_in_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");

        assert!(create_log_file(&log_dir).is_some());
        assert!(log_file_path(&log_dir).exists());
        assert_eq!(log_file_path(&log_dir).file_name().unwrap(), LOG_FILE_NAME);
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(None, false);
        init_logging(Some(&Config::default()), false);
    }
}
