//! Transport port for issuing HTTP calls.
//!
//! The harness owns no transport of its own: TLS, connection pooling,
//! and the wire protocol all belong to the adapter behind this trait.

use async_trait::async_trait;
use thiserror::Error;

use pactum_domain::{HttpMethod, TransportErrorKind};

/// A single HTTP request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully resolved URL, query string included.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
}

impl TransportRequest {
    /// Creates a request with no headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// The raw response a transport hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Status code.
    pub status: u16,
    /// Response headers as received.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// A transport-level failure: no response was obtained.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transport failure ({kind:?}): {message}")]
pub struct TransportFailure {
    /// Failure classification.
    pub kind: TransportErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl TransportFailure {
    /// Creates a new failure.
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Port for sending HTTP requests.
///
/// Implementations must be safe to share across the runner's worker
/// tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the response, or a classified
    /// failure if no response could be obtained.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure>;
}
