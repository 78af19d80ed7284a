//! One pass of a request through the authenticated client.

use farmhand_domain::ApiRequest;
use farmhand_domain::request::AUTHORIZATION;

/// Whether this pass is the caller's original send or the single replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    /// First send, eligible for refresh-and-replay on 401.
    Original,
    /// Re-send after a refresh; a 401 here is final.
    Replay,
}

/// A request together with its attempt marker and the bearer token it
/// carries. The caller's request value is never mutated.
#[derive(Debug, Clone)]
pub struct Attempt {
    request: ApiRequest,
    kind: AttemptKind,
    token: Option<String>,
}

impl Attempt {
    /// Wraps a caller's request for its first send.
    #[must_use]
    pub const fn original(request: ApiRequest, token: Option<String>) -> Self {
        Self {
            request,
            kind: AttemptKind::Original,
            token,
        }
    }

    /// Turns this attempt into its replay carrying `token`.
    #[must_use]
    pub fn replay(self, token: String) -> Self {
        Self {
            request: self.request,
            kind: AttemptKind::Replay,
            token: Some(token),
        }
    }

    /// Returns the caller's request as submitted.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Returns the attempt marker.
    #[must_use]
    pub const fn kind(&self) -> AttemptKind {
        self.kind
    }

    /// Returns true for the replay pass.
    #[must_use]
    pub const fn is_replay(&self) -> bool {
        matches!(self.kind, AttemptKind::Replay)
    }

    /// Returns the bearer token this attempt is sent with.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Builds the request handed to the transport.
    ///
    /// With a token the `Authorization` header is replaced by the bearer
    /// credential; without one the caller's headers pass through untouched.
    #[must_use]
    pub fn outgoing(&self) -> ApiRequest {
        let mut request = self.request.clone();
        if let Some(token) = &self.token {
            request.headers.set(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }
}
