//! Diagnostic logging to stderr.
//!
//! Level precedence: `RUST_LOG`, then `--debug`, then the configured level.
//! Stdout is reserved for command output.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "warn";

/// Filter for the given flags, ignoring `RUST_LOG`.
pub fn filter_for(debug: bool, configured: &str) -> EnvFilter {
    let level = if debug { "debug" } else { configured };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(debug: bool, configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(debug, configured));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
