//! Connection configuration for Bugzilla servers.

use crate::error::{BugzillaError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the XML-RPC transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// XML-RPC endpoint.
    ///
    /// Examples:
    /// - Red Hat: "https://bugzilla.redhat.com/xmlrpc.cgi"
    /// - freedesktop: "https://bugzilla.freedesktop.org/xmlrpc.cgi"
    pub url: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// User-Agent header sent with every call.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Keep session cookies between calls. Off means anonymous, read-only
    /// access with nothing persisted.
    #[serde(default)]
    pub cookies: bool,
}

impl TransportConfig {
    /// Create a new transport configuration for an endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            cookies: false,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable or disable the in-memory cookie jar.
    pub fn with_cookies(mut self, cookies: bool) -> Self {
        self.cookies = cookies;
        self
    }

    /// Reject settings no request could succeed with.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url)
            .map_err(|e| BugzillaError::Config(format!("invalid endpoint {}: {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(BugzillaError::Config(format!(
                "endpoint must be an http(s) URL with a host: {}",
                self.url
            )));
        }
        if self.timeout.is_zero() {
            return Err(BugzillaError::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    format!("bugzilla-rs/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_builder() {
        let config = TransportConfig::new("https://bugzilla.redhat.com/xmlrpc.cgi")
            .with_timeout(Duration::from_secs(10))
            .with_user_agent("test-agent")
            .with_cookies(true);

        assert_eq!(config.url, "https://bugzilla.redhat.com/xmlrpc.cgi");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, "test-agent");
        assert!(config.cookies);
    }

    #[test]
    fn test_transport_config_defaults() {
        let config = TransportConfig::new("https://example.org/xmlrpc.cgi");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.user_agent.starts_with("bugzilla-rs/"));
        assert!(!config.cookies);
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        assert!(TransportConfig::new("https://bugzilla.redhat.com/xmlrpc.cgi")
            .validate()
            .is_ok());

        let zero = TransportConfig::new("https://bugzilla.redhat.com/xmlrpc.cgi")
            .with_timeout(Duration::ZERO);
        assert!(matches!(zero.validate(), Err(BugzillaError::Config(_))));

        for url in ["bugzilla.redhat.com", "ftp://bugzilla.redhat.com/xmlrpc.cgi"] {
            let err = TransportConfig::new(url).validate().unwrap_err();
            assert!(matches!(err, BugzillaError::Config(_)), "{}", url);
        }
    }
}
