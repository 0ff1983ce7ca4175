//! Picks the protocol generation for a server URL.
//!
//! Resolution order: an explicit override, then the table of known
//! deployments (matched on host), then one `Bugzilla.version` probe. The
//! vendor generation is never inferred from a version number.

use crate::adapter::ProtocolAdapter;
use crate::error::{BugzillaError, Result};
use crate::generation::Generation;
use crate::transport::Transport;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Status set used when a deployment does not say otherwise.
pub const DEFAULT_CLOSED_STATUS: &str = "CLOSED";

/// A known Bugzilla installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub host: String,
    pub generation: Generation,
    /// Comma-separated statuses that count as closed on this server.
    #[serde(default = "default_closed_status")]
    pub closed_status: String,
}

impl Deployment {
    pub fn new(
        host: impl Into<String>,
        generation: Generation,
        closed_status: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            generation,
            closed_status: closed_status.into(),
        }
    }

    pub fn closed_statuses(&self) -> Vec<String> {
        split_statuses(&self.closed_status)
    }
}

fn default_closed_status() -> String {
    DEFAULT_CLOSED_STATUS.to_string()
}

/// The deployments recognized without any configuration.
pub fn builtin_deployments() -> Vec<Deployment> {
    vec![
        Deployment::new("bugzilla.kernel.org", Generation::G1, "CLOSED"),
        Deployment::new("bugzilla.gnome.org", Generation::G2, "RESOLVED"),
        Deployment::new("bugzilla.freedesktop.org", Generation::G3, "CLOSED,RESOLVED"),
        Deployment::new("bugzilla.redhat.com", Generation::Gx, "CLOSED"),
    ]
}

/// Maps server URLs to generations and default status sets.
#[derive(Debug, Clone)]
pub struct AdapterResolver {
    deployments: Vec<Deployment>,
}

impl Default for AdapterResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterResolver {
    /// Resolver knowing only the built-in deployments.
    pub fn new() -> Self {
        Self {
            deployments: builtin_deployments(),
        }
    }

    /// Add deployments; an entry for an already known host replaces it.
    pub fn with_deployments(mut self, deployments: impl IntoIterator<Item = Deployment>) -> Self {
        for deployment in deployments {
            let host = deployment.host.to_ascii_lowercase();
            match self
                .deployments
                .iter_mut()
                .find(|known| known.host.eq_ignore_ascii_case(&host))
            {
                Some(known) => *known = deployment,
                None => self.deployments.push(deployment),
            }
        }
        self
    }

    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    /// The known deployment serving `url`, if any.
    pub fn deployment_for(&self, url: &str) -> Result<Option<&Deployment>> {
        let host = host_of(url)?;
        Ok(self
            .deployments
            .iter()
            .find(|deployment| deployment.host.eq_ignore_ascii_case(&host)))
    }

    /// Decide the generation of `url`, probing the server only when neither
    /// an override nor a known deployment settles it.
    pub fn generation_for(
        &self,
        url: &str,
        generation: Option<Generation>,
        rpc: &dyn Transport,
    ) -> Result<Generation> {
        if let Some(generation) = generation {
            // still reject garbage URLs
            host_of(url)?;
            debug!(%generation, url, "Using generation override");
            return Ok(generation);
        }

        if let Some(deployment) = self.deployment_for(url)? {
            debug!(generation = %deployment.generation, host = %deployment.host, "Known deployment");
            return Ok(deployment.generation);
        }

        let response = rpc.call("Bugzilla.version", json!({}))?;
        let version = response
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BugzillaError::MalformedResponse(
                    "Bugzilla.version response has no version".to_string(),
                )
            })?;
        let generation = Generation::from_server_version(version)?;
        debug!(%generation, version, "Probed server version");
        Ok(generation)
    }

    /// Build the adapter for `url` over `transport`.
    pub fn resolve<T>(
        &self,
        url: &str,
        generation: Option<Generation>,
        transport: T,
    ) -> Result<ProtocolAdapter>
    where
        T: Transport + 'static,
    {
        let generation = self.generation_for(url, generation, &transport)?;
        info!(%generation, url, "Resolved Bugzilla adapter");
        Ok(ProtocolAdapter::new(generation, url, transport))
    }

    /// Default status set for queries against `url`.
    pub fn closed_status_for(&self, url: &str) -> Result<Vec<String>> {
        Ok(match self.deployment_for(url)? {
            Some(deployment) => deployment.closed_statuses(),
            None => split_statuses(DEFAULT_CLOSED_STATUS),
        })
    }
}

/// Turn a user-supplied server location into an XML-RPC endpoint.
///
/// A bare host gets `https://`; a URL without a path gets `/xmlrpc.cgi`.
pub fn endpoint_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let mut url = parse(&with_scheme)?;
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/xmlrpc.cgi");
    }
    Ok(url.to_string())
}

/// The XML-RPC endpoint of the server a web page URL (such as a
/// `buglist.cgi` saved search) belongs to.
pub fn origin_endpoint(page_url: &str) -> Result<String> {
    let page = parse(page_url.trim())?;
    if page.host_str().is_none() {
        return Err(BugzillaError::InvalidRequest(format!(
            "URL has no host: {}",
            page_url
        )));
    }
    let endpoint = page
        .join("xmlrpc.cgi")
        .map_err(|e| BugzillaError::InvalidRequest(format!("bad URL {}: {}", page_url, e)))?;
    Ok(endpoint.to_string())
}

/// Lowercased host name of `url`.
pub fn server_host(url: &str) -> Result<String> {
    host_of(url)
}

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| BugzillaError::InvalidRequest(format!("bad URL {}: {}", url, e)))
}

fn host_of(url: &str) -> Result<String> {
    let parsed = parse(url)?;
    parsed
        .host_str()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| BugzillaError::InvalidRequest(format!("URL has no host: {}", url)))
}

fn split_statuses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockTransport};
    use std::sync::Arc;

    #[test]
    fn test_known_hosts_need_no_probe() {
        let resolver = AdapterResolver::new();
        let transport = MockTransport::new();

        let cases = [
            (fixtures::KERNEL_URL, Generation::G1),
            (fixtures::GNOME_URL, Generation::G2),
            (fixtures::FREEDESKTOP_URL, Generation::G3),
            (fixtures::REDHAT_URL, Generation::Gx),
        ];
        for (url, expected) in cases {
            assert_eq!(resolver.generation_for(url, None, &transport).unwrap(), expected);
        }
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_override_wins() {
        let transport = Arc::new(MockTransport::new());
        let adapter = AdapterResolver::new()
            .resolve(fixtures::REDHAT_URL, Some(Generation::G3), transport.clone())
            .unwrap();
        assert_eq!(adapter.generation(), Generation::G3);
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_unknown_host_is_probed() {
        let transport = MockTransport::new()
            .respond("Bugzilla.version", json!({"version": "3.6.4"}));
        let generation = AdapterResolver::new()
            .generation_for("https://bugs.example.org/xmlrpc.cgi", None, &transport)
            .unwrap();
        assert_eq!(generation, Generation::G2);
        assert_eq!(transport.methods(), vec!["Bugzilla.version"]);
    }

    #[test]
    fn test_probe_failure_propagates() {
        let transport = MockTransport::new();
        let err = AdapterResolver::new()
            .generation_for("https://bugs.example.org/xmlrpc.cgi", None, &transport)
            .unwrap_err();
        assert!(err.is_remote());
    }

    #[test]
    fn test_closed_status_per_deployment() {
        let resolver = AdapterResolver::new();
        assert_eq!(
            resolver.closed_status_for(fixtures::FREEDESKTOP_URL).unwrap(),
            vec!["CLOSED", "RESOLVED"]
        );
        assert_eq!(
            resolver.closed_status_for(fixtures::GNOME_URL).unwrap(),
            vec!["RESOLVED"]
        );
        assert_eq!(
            resolver
                .closed_status_for("https://bugs.example.org/xmlrpc.cgi")
                .unwrap(),
            vec!["CLOSED"]
        );
    }

    #[test]
    fn test_configured_deployment_overrides_builtin() {
        let resolver = AdapterResolver::new().with_deployments([
            Deployment::new("Bugzilla.Gnome.org", Generation::G3, "RESOLVED,VERIFIED"),
            Deployment::new("bugs.example.org", Generation::G3, "DONE"),
        ]);
        assert_eq!(resolver.deployments().len(), 5);

        let gnome = resolver.deployment_for(fixtures::GNOME_URL).unwrap().unwrap();
        assert_eq!(gnome.generation, Generation::G3);
        assert_eq!(
            resolver
                .closed_status_for("https://bugs.example.org/xmlrpc.cgi")
                .unwrap(),
            vec!["DONE"]
        );
    }

    #[test]
    fn test_bad_url_is_invalid_request() {
        let resolver = AdapterResolver::new();
        let err = resolver
            .generation_for("not a url", Some(Generation::G3), &MockTransport::new())
            .unwrap_err();
        assert!(matches!(err, BugzillaError::InvalidRequest(_)));
        assert!(resolver.closed_status_for("::").is_err());
    }

    #[test]
    fn test_origin_endpoint() {
        assert_eq!(
            origin_endpoint("https://bugzilla.redhat.com/buglist.cgi?product=Fedora&component=python-bugzilla")
                .unwrap(),
            fixtures::REDHAT_URL
        );
        assert_eq!(
            origin_endpoint("http://bugs.example.org:8080/bugzilla/buglist.cgi?id=1").unwrap(),
            "http://bugs.example.org:8080/bugzilla/xmlrpc.cgi"
        );
        assert!(origin_endpoint("buglist.cgi?product=Fedora").is_err());
        assert_eq!(server_host("https://Bugzilla.RedHat.com/xmlrpc.cgi").unwrap(), "bugzilla.redhat.com");
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("bugzilla.redhat.com").unwrap(),
            "https://bugzilla.redhat.com/xmlrpc.cgi"
        );
        assert_eq!(
            endpoint_url("https://bugzilla.gnome.org/").unwrap(),
            "https://bugzilla.gnome.org/xmlrpc.cgi"
        );
        assert_eq!(
            endpoint_url(fixtures::FREEDESKTOP_URL).unwrap(),
            fixtures::FREEDESKTOP_URL
        );
    }
}
