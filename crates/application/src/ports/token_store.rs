//! Token persistence port

use farmhand_domain::TokenPair;

/// Synchronous storage for the access/refresh token pair.
///
/// Reads never fail: an absent token is a valid state and reads as `None`,
/// including before anything was ever stored. Implementations must make a
/// `set` visible to the very next `get`/`get_refresh` on any thread.
pub trait TokenStore: Send + Sync {
    /// Returns the current access token.
    fn get(&self) -> Option<String>;

    /// Returns the current refresh token.
    fn get_refresh(&self) -> Option<String>;

    /// Stores the access token, and the refresh token when one is given.
    ///
    /// Both values are written under a single update so readers never see
    /// a new access token next to a stale refresh token.
    fn set(&self, access_token: &str, refresh_token: Option<&str>);

    /// Clears both tokens. Calling it on an empty store is a no-op.
    fn remove(&self);

    /// Returns both tokens when a full pair is stored.
    fn pair(&self) -> Option<TokenPair> {
        Some(TokenPair::new(self.get()?, self.get_refresh()?))
    }

    /// Stores a full pair.
    fn set_pair(&self, pair: &TokenPair) {
        self.set(&pair.access_token, Some(pair.refresh_token.as_str()));
    }
}
