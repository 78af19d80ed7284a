//! HTTP transport port

use async_trait::async_trait;
use thiserror::Error;
use farmhand_domain::{ApiRequest, ApiResponse};

/// Failures that prevent a request from producing any HTTP response.
///
/// A response with an error status is not a `TransportError`; the transport
/// returns it as a normal [`ApiResponse`] and the client classifies it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The base URL and request path do not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request exceeded its deadline.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed to resolve
        host: String,
        /// Resolver message
        message: String,
    },

    /// The server refused the TCP connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// The connection failed for another reason (TLS, reset, ...).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for sending a single HTTP request to the backend.
///
/// Implementations resolve [`ApiRequest::path`] against their base URL,
/// send exactly the headers on the request, and return every HTTP answer
/// (including 4xx/5xx) as `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no HTTP response was received.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
