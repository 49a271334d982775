//! Tracing subscriber setup.
//!
//! Logs go to stderr so that JSON and YAML reports on stdout stay
//! machine-readable. The filter comes from `RUST_LOG`, then the `[logging]`
//! config section, then [`DEFAULT_FILTER`].

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Filter used when nothing else is configured
pub const DEFAULT_FILTER: &str = "warn";
/// Filter used with `--verbose`
pub const VERBOSE_FILTER: &str = "warn,sql_analysis_engine=debug";

/// Pick the filter directive for this run
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        return VERBOSE_FILTER.to_string();
    }
    config
        .filter
        .clone()
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber; a second call is a no-op
pub fn init_logging(config: &LoggingConfig, verbose: bool, colored: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(colored)
                .with_target(false)
        )
        .try_init();
}
