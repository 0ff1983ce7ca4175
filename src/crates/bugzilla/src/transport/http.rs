//! Blocking HTTP transport for XML-RPC endpoints.

use crate::config::TransportConfig;
use crate::error::{BugzillaError, Result};
use crate::transport::{xmlrpc, Transport};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// Posts XML-RPC calls to a single endpoint.
pub struct HttpTransport {
    config: TransportConfig,
    client: Client,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint.
    pub fn new(config: TransportConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .cookie_store(config.cookies)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

impl Transport for HttpTransport {
    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = xmlrpc::encode_call(method, &params);
        let started = Instant::now();

        let response = self
            .client
            .post(&self.config.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(BugzillaError::Transport(format!(
                "{} returned HTTP {}: {}",
                self.config.url,
                status,
                error_text.trim()
            )));
        }

        let text = response.text()?;
        debug!(
            method,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = text.len(),
            "XML-RPC call completed"
        );

        xmlrpc::decode_response(&text)
    }
}
