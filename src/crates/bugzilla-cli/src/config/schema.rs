//! Configuration schema

use bugzilla::{AdapterResolver, Deployment, TransportConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level keys the schema knows about.
pub(crate) const KNOWN_KEYS: &[&str] = &["default_url", "transport", "logging", "deployments"];

/// Main CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BugzillaConfig {
    /// Server used when `--bugzilla` is not given
    #[serde(default)]
    pub default_url: Option<String>,

    #[serde(default)]
    pub transport: TransportSection,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra or overriding known deployments
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportSection {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Keep session cookies between calls
    #[serde(default)]
    pub cookies: bool,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            cookies: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    crate::logging::DEFAULT_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl BugzillaConfig {
    /// Apply environment overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BUGZILLA_URL").filter(|url| !url.trim().is_empty()) {
            self.default_url = Some(url);
        }
    }

    /// Apply overrides from the process environment.
    pub fn resolve_env_vars(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    /// Transport settings for `url`, with an optional timeout override.
    pub fn transport_config(&self, url: &str, timeout_secs: Option<u64>) -> TransportConfig {
        let timeout = timeout_secs.unwrap_or(self.transport.timeout_secs);
        let user_agent = self
            .transport
            .user_agent
            .clone()
            .unwrap_or_else(crate::version::user_agent);

        TransportConfig::new(url)
            .with_timeout(Duration::from_secs(timeout))
            .with_user_agent(user_agent)
            .with_cookies(self.transport.cookies)
    }

    /// Built-in deployments plus the configured ones.
    pub fn resolver(&self) -> AdapterResolver {
        AdapterResolver::new().with_deployments(self.deployments.iter().cloned())
    }
}
