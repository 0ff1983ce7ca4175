//! Errors raised by the CLI layer itself.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No Bugzilla server given; pass --bugzilla, set BUGZILLA_URL or configure default_url")]
    NoServer,

    #[error(transparent)]
    Bugzilla(#[from] bugzilla::BugzillaError),
}
