//! Configuration for the bugzilla CLI
//!
//! Layers, later ones overriding earlier ones:
//! - Built-in defaults
//! - User-level: `$CONFIG_DIR/bugzilla/bugzilla.toml`
//! - Project-level: `./.bugzilla.toml`
//! - An explicit `--config` file
//!
//! `BUGZILLA_URL` in the environment overrides `default_url`.

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::{BugzillaConfig, LoggingConfig, TransportSection};
