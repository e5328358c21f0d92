//! Structured logging for the cave generator.
//!
//! Console output with uptime timestamps and module paths, plus a JSON log
//! file in debug builds. The level comes from `RUST_LOG`, then from
//! `debug.log_level` in the config.

use std::fs::File;
use std::path::Path;

use cavern_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written into the log directory.
pub const LOG_FILE_NAME: &str = "cavern.log";

/// Filter string from the config, or [`DEFAULT_FILTER`].
pub fn filter_from_config(config: Option<&Config>) -> String {
    config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Create the JSON log file when file logging applies: a debug build, a log
/// directory and `debug.log_to_file` (on when there is no config).
pub fn open_log_file(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<File> {
    let file_enabled = config.is_none_or(|c| c.debug.log_to_file);
    if !debug_build || !file_enabled {
        return None;
    }
    let log_dir = log_dir?;
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether file logging is allowed
/// * `config` - source of the log level and the `log_to_file` switch
///
/// ```no_run
/// use cavern_config::Config;
/// use cavern_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_from_config(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(log_file) = open_log_file(log_dir, debug_build, config) {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter_str = format!("{}", default_env_filter());
        assert!(filter_str.contains("info"), "{filter_str}");
    }

    #[test]
    fn test_filter_from_config() {
        let mut config = Config::default();
        assert_eq!(filter_from_config(Some(&config)), "info");

        config.debug.log_level = "debug,cavern_terrain=trace".to_string();
        assert_eq!(filter_from_config(Some(&config)), "debug,cavern_terrain=trace");

        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_from_config(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_from_config(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_log_file_created_in_debug_build() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let config = Config::default();
        assert!(open_log_file(Some(&log_dir), true, Some(&config)).is_some());
        assert!(log_dir.join(LOG_FILE_NAME).exists(), "no log file in {}", log_dir.display());
    }

    #[test]
    fn test_log_file_switches() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.debug.log_to_file = false;

        assert!(open_log_file(Some(dir.path()), true, Some(&config)).is_none());
        assert!(open_log_file(Some(dir.path()), false, None).is_none());
        assert!(open_log_file(None, true, None).is_none());
        assert!(!dir.path().join(LOG_FILE_NAME).exists());

        // Without a config the file is written.
        assert!(open_log_file(Some(dir.path()), true, None).is_some());
    }
}
