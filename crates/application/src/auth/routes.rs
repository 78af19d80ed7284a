//! Backend auth routes and the unauthenticated allow-list.

use serde::{Deserialize, Serialize};

/// Paths of the backend auth endpoints, relative to the API root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthRoutes {
    /// Exchanges email/password for a token pair.
    pub sign_in: String,
    /// Creates an account and returns a token pair.
    pub sign_up: String,
    /// Exchanges a refresh token for a new pair.
    pub refresh: String,
    /// Revokes the current session.
    pub sign_out: String,
    /// Returns the authenticated user.
    pub current_user: String,
    /// Extra paths that must be sent without a bearer token.
    pub extra_public: Vec<String>,
}

impl Default for AuthRoutes {
    fn default() -> Self {
        Self {
            sign_in: "/auth/sign-in".to_string(),
            sign_up: "/auth/sign-up".to_string(),
            refresh: "/auth/refresh".to_string(),
            sign_out: "/auth/sign-out".to_string(),
            current_user: "/auth/me".to_string(),
            extra_public: Vec::new(),
        }
    }
}

impl AuthRoutes {
    /// Returns true if requests to `path` are sent without a bearer token.
    ///
    /// Sign-in, sign-up and refresh are always public. Sign-out and the
    /// current-user endpoint are not.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        [&self.sign_in, &self.sign_up, &self.refresh]
            .into_iter()
            .chain(&self.extra_public)
            .any(|public| same_path(public, path))
    }

    /// Returns true if `path` is the refresh endpoint.
    #[must_use]
    pub fn is_refresh(&self, path: &str) -> bool {
        same_path(&self.refresh, path)
    }
}

fn same_path(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list() {
        let routes = AuthRoutes::default();
        assert!(routes.is_public("/auth/sign-in"));
        assert!(routes.is_public("/auth/sign-up"));
        assert!(routes.is_public("/auth/refresh/"));
        assert!(!routes.is_public("/auth/me"));
        assert!(!routes.is_public("/auth/sign-out"));
        assert!(!routes.is_public("/api-keys"));
    }

    #[test]
    fn test_refresh_detection() {
        let routes = AuthRoutes::default();
        assert!(routes.is_refresh("/auth/refresh"));
        assert!(!routes.is_refresh("/auth/refresh-all"));
    }

    #[test]
    fn test_extra_public_paths() {
        let routes = AuthRoutes {
            extra_public: vec!["/health".to_string()],
            ..AuthRoutes::default()
        };
        assert!(routes.is_public("/health"));
    }
}
