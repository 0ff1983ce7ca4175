//! Build metadata injected by `build.rs`.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git commit the binary was built from, or "unknown".
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// RFC 3339 build timestamp.
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

/// Text shown by `bugzilla --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// User-Agent sent to Bugzilla servers.
pub fn user_agent() -> String {
    format!("bugzilla-cli/{}", VERSION)
}
