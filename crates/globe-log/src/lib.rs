//! Structured logging for the terrain pipeline.
//!
//! Installs a `tracing` subscriber with console output (uptime timestamps,
//! module paths) and, in debug builds, an optional JSON log file for
//! post-mortem analysis of frame timings and dispatch sizes. The level comes
//! from `RUST_LOG` when set, otherwise from [`DebugConfig::log_level`].

use std::path::Path;

use globe_config::DebugConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written into the log directory.
pub const LOG_FILE_NAME: &str = "globe.log";

/// Build the filter directive string for the given debug settings.
///
/// A bare level such as `"debug"` is extended with the wgpu/naga quieting
/// directives; a full directive list (containing `=` or `,`) is used as-is.
pub fn filter_directive(config: Option<&DebugConfig>) -> String {
    match config.map(|c| c.log_level.trim()) {
        Some(level) if level.contains('=') || level.contains(',') => level.to_string(),
        Some(level) if !level.is_empty() => format!("{level},wgpu=warn,naga=warn"),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file
/// * `config` - debug settings supplying the level and the file toggle
///
/// The JSON file layer is only installed in debug builds when
/// `config.log_to_file` is set and `log_dir` can be created. Calling this
/// twice is harmless; the second call leaves the first subscriber in place.
pub fn init_logging(log_dir: Option<&Path>, config: Option<&DebugConfig>) {
    let filter_str = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let want_file = cfg!(debug_assertions) && config.is_some_and(|c| c.log_to_file);
    if want_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
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

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
