//! Subscriber setup for the binaries.
//!
//! Everything logs to stderr: the worker's stdout is the result channel and
//! the CLI's stdout is user output. The filter comes from `CALC_LOG` using
//! `tracing_subscriber::EnvFilter` syntax and defaults to `warn`.

use crate::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Calling it twice is harmless.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
