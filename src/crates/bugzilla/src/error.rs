//! Error types for the Bugzilla query layer.

use crate::generation::{Generation, Operation};
use thiserror::Error;

/// Result type for Bugzilla operations.
pub type Result<T> = std::result::Result<T, BugzillaError>;

/// Errors that can occur while talking to a Bugzilla server.
///
/// The variants fall into three families that callers are expected to tell
/// apart: the server generation cannot do what was asked
/// ([`BugzillaError::UnsupportedOperation`]), the call itself failed
/// ([`BugzillaError::is_remote`]), or the server answered with something the
/// adapter cannot normalize ([`BugzillaError::MalformedResponse`]).
#[derive(Debug, Error)]
pub enum BugzillaError {
    /// The server generation does not offer this operation.
    #[error("{operation} is not supported by {generation} servers")]
    UnsupportedOperation {
        operation: Operation,
        generation: Generation,
    },

    /// The server returned an XML-RPC fault.
    #[error("Server fault {code}: {message}")]
    Fault { code: i64, message: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport could not produce a usable response body.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be normalized into bug records.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid request parameters (bad URL, bad generation name, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BugzillaError {
    pub(crate) fn unsupported(operation: Operation, generation: Generation) -> Self {
        BugzillaError::UnsupportedOperation {
            operation,
            generation,
        }
    }

    /// Check if the server generation lacks the requested capability.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, BugzillaError::UnsupportedOperation { .. })
    }

    /// Check if this error wraps a transport or service-side failure.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            BugzillaError::Fault { .. } | BugzillaError::Http(_) | BugzillaError::Transport(_)
        )
    }

    /// Check if the adapter could not normalize the response.
    pub fn is_malformed(&self) -> bool {
        matches!(self, BugzillaError::MalformedResponse(_))
    }
}

impl From<quick_xml::Error> for BugzillaError {
    fn from(err: quick_xml::Error) -> Self {
        BugzillaError::Transport(format!("XML decode failed: {}", err))
    }
}
