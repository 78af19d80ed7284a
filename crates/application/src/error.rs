//! Application error types

use thiserror::Error;
use farmhand_domain::DomainError;
use farmhand_domain::response::UNAUTHORIZED;

use crate::ports::TransportError;

/// Errors surfaced by the authenticated client and the use cases built on it.
///
/// `Clone` so a single refresh failure can be delivered to every request
/// queued behind it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// A request was rejected before it reached the transport.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// A request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Serialization(String),

    /// A 2xx response body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The refresh this request was waiting on was dropped before it settled.
    #[error("token refresh was abandoned before it completed")]
    RefreshAbandoned,

    /// A background task did not reach a terminal state in time.
    #[error("task {task_id} still not finished after {attempts} polls")]
    PollTimedOut {
        /// Task being polled
        task_id: String,
        /// Number of polls made
        attempts: u32,
    },
}

impl ClientError {
    /// Returns true for a 401 answer from the backend.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == UNAUTHORIZED)
    }

    /// Returns the HTTP status, if the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl ClientError {
    pub(crate) fn encode(error: &serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
