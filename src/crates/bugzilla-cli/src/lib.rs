//! # bugzilla-cli
//!
//! The `bugzilla` command: `info` and `query` against any supported
//! Bugzilla server, with layered TOML configuration and stderr logging.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod version;

pub use cli::{Cli, Command, GlobalArgs, Session};
pub use config::{BugzillaConfig, ConfigLoader};
pub use error::{CliError, Result};
