//! Sign-in, sign-out and the cached current user.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use farmhand_domain::{ApiRequest, AuthSession, Credentials, Registration, User};

use crate::auth::AuthEvent;
use crate::client::AuthenticatedHttpClient;
use crate::error::ClientResult;
use crate::ports::{HttpTransport, TokenStore};

/// Owns the console session: token acquisition, the signed-in user, and
/// sign-out.
pub struct SessionService<T, S> {
    client: Arc<AuthenticatedHttpClient<T, S>>,
    user: Arc<RwLock<Option<User>>>,
}

impl<T: HttpTransport, S: TokenStore> SessionService<T, S> {
    /// Creates a session service over a shared client.
    #[must_use]
    pub fn new(client: Arc<AuthenticatedHttpClient<T, S>>) -> Self {
        Self {
            client,
            user: Arc::new(RwLock::new(None)),
        }
    }

    /// Signs in and persists the issued token pair.
    ///
    /// # Errors
    /// Returns [`crate::ClientError::Status`] with the backend message for
    /// rejected credentials, or the transport/decode error.
    pub async fn sign_in(&self, credentials: &Credentials) -> ClientResult<User> {
        let path = self.client.routes().sign_in.clone();
        let session: AuthSession = self.client.post_json(&path, credentials).await?;
        Ok(self.establish(session))
    }

    /// Creates an account and signs in with it.
    ///
    /// # Errors
    /// Same as [`Self::sign_in`].
    pub async fn sign_up(&self, registration: &Registration) -> ClientResult<User> {
        let path = self.client.routes().sign_up.clone();
        let session: AuthSession = self.client.post_json(&path, registration).await?;
        Ok(self.establish(session))
    }

    /// Ends the session. The backend call is best effort; local credentials
    /// are always cleared.
    pub async fn sign_out(&self) {
        if self.client.token_store().get().is_some() {
            let request = ApiRequest::post(self.client.routes().sign_out.clone());
            if let Err(error) = self.client.send(request).await {
                warn!(%error, "sign-out request failed, clearing local session anyway");
            }
        }
        self.client.token_store().remove();
        *self.user.write() = None;
        info!("signed out");
    }

    /// Fetches the signed-in user and caches it.
    ///
    /// # Errors
    /// Returns the client error; a 401 here goes through the refresh flow
    /// first.
    pub async fn current_user(&self) -> ClientResult<User> {
        let path = self.client.routes().current_user.clone();
        let user: User = self.client.get_json(&path).await?;
        *self.user.write() = Some(user.clone());
        Ok(user)
    }

    /// Returns the last user seen by this service.
    #[must_use]
    pub fn cached_user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Returns true while an access token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.client.token_store().get().is_some()
    }

    fn establish(&self, session: AuthSession) -> User {
        self.client.token_store().set_pair(&session.tokens);
        info!(email = %session.user.email, role = ?session.user.role, "signed in");
        *self.user.write() = Some(session.user.clone());
        session.user
    }
}

impl<T, S> SessionService<T, S>
where
    T: HttpTransport + 'static,
    S: TokenStore + 'static,
{
    /// Keeps the cached user in step with token refreshes.
    ///
    /// The spawned task reloads the user after every refresh and drops it
    /// when a refresh fails. It ends once the client is dropped.
    #[must_use = "dropping the handle detaches the watcher"]
    pub fn watch_refreshes(&self) -> JoinHandle<()> {
        let mut events = self.client.events().listen();
        let client = Arc::downgrade(&self.client);
        let user = Arc::clone(&self.user);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::TokenRefreshed { .. }) => {
                        let Some(client) = Weak::upgrade(&client) else { break };
                        let service = Self { client, user: Arc::clone(&user) };
                        if let Err(error) = service.current_user().await {
                            warn!(%error, "could not reload user after token refresh");
                        }
                    }
                    Ok(AuthEvent::RefreshFailed) => {
                        debug!("session ended by refresh failure");
                        *user.write() = None;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "auth event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::test_support::{ScriptedTransport, session_body};
    use farmhand_domain::{TokenPair, UserRole};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type Client = AuthenticatedHttpClient<ScriptedTransport, MemoryTokenStore>;

    fn session(transport: &ScriptedTransport, store: MemoryTokenStore) -> SessionService<ScriptedTransport, MemoryTokenStore> {
        SessionService::new(Arc::new(Client::new(
            Arc::new(transport.clone()),
            Arc::new(store),
        )))
    }

    async fn until(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if condition() {
                return true;
            }
            tokio::task::yield_now().await;
        }
        condition()
    }

    #[tokio::test]
    async fn test_sign_in_persists_pair_and_caches_user() {
        let transport = ScriptedTransport::accepting("T1");
        transport.respond("/auth/sign-in", 200, session_body("T1", "RT1"));
        let session = session(&transport, MemoryTokenStore::new());

        let user = session
            .sign_in(&Credentials::new("ops@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(user.role, UserRole::Admin);
        assert!(session.is_authenticated());
        assert_eq!(session.cached_user(), Some(user));
        assert_eq!(
            session.client.token_store().pair(),
            Some(TokenPair::new("T1", "RT1"))
        );
        assert_eq!(
            transport.bodies("/auth/sign-in"),
            vec![json!({"email": "ops@example.com", "password": "pw"})]
        );
    }

    #[tokio::test]
    async fn test_rejected_sign_in_stores_nothing() {
        let transport = ScriptedTransport::accepting("T1");
        transport.respond("/auth/sign-in", 401, json!({"detail": "invalid credentials"}));
        let session = session(&transport, MemoryTokenStore::new());

        let error = session
            .sign_in(&Credentials::new("ops@example.com", "bad"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(401));
        assert!(!session.is_authenticated());
        assert_eq!(session.cached_user(), None);
    }

    #[tokio::test]
    async fn test_sign_up_posts_registration() {
        let transport = ScriptedTransport::accepting("T1");
        transport.respond("/auth/sign-up", 200, session_body("T1", "RT1"));
        let session = session(&transport, MemoryTokenStore::new());
        let registration = Registration {
            credentials: Credentials::new("new@example.com", "pw"),
            name: Some("New".to_string()),
        };

        session.sign_up(&registration).await.unwrap();

        assert_eq!(
            transport.bodies("/auth/sign-up"),
            vec![json!({"email": "new@example.com", "password": "pw", "name": "New"})]
        );
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_when_backend_fails() {
        let transport = ScriptedTransport::accepting("T1");
        transport.respond("/auth/sign-out", 500, json!({"message": "boom"}));
        let session = session(&transport, MemoryTokenStore::with_pair(&TokenPair::new("T1", "RT1")));

        session.sign_out().await;

        assert_eq!(transport.bearer_tokens("/auth/sign-out"), vec![Some("T1".to_string())]);
        assert!(!session.is_authenticated());
        assert_eq!(session.client.token_store().get_refresh(), None);
    }

    #[tokio::test]
    async fn test_sign_out_without_session_skips_backend() {
        let transport = ScriptedTransport::accepting("T1");
        let session = session(&transport, MemoryTokenStore::new());

        session.sign_out().await;

        assert_eq!(transport.calls("/auth/sign-out"), 0);
    }

    #[tokio::test]
    async fn test_current_user_refreshes_expired_token() {
        let transport = ScriptedTransport::accepting("T2");
        transport.respond("/auth/refresh", 200, session_body("T2", "RT2"));
        transport.protect("/auth/me", json!({"id": "u1", "email": "ops@example.com"}));
        let session = session(&transport, MemoryTokenStore::with_pair(&TokenPair::new("T1", "RT1")));

        let user = session.current_user().await.unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(session.cached_user(), Some(user));
        assert_eq!(
            transport.bearer_tokens("/auth/me"),
            vec![Some("T1".to_string()), Some("T2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_watcher_tracks_refresh_events() {
        let transport = ScriptedTransport::accepting("T2");
        transport.respond("/auth/refresh", 200, session_body("T2", "RT2"));
        transport.respond("/auth/me", 200, json!({"id": "u9", "email": "ops@example.com"}));
        let session = session(&transport, MemoryTokenStore::with_pair(&TokenPair::new("T1", "RT1")));
        let watcher = session.watch_refreshes();

        session.client.send(ApiRequest::get("/agents")).await.unwrap();
        assert!(until(|| session.cached_user().is_some()).await);
        assert_eq!(session.cached_user().unwrap().id, "u9");

        session.client.events().refresh_failed();
        assert!(until(|| session.cached_user().is_none()).await);

        drop(session);
        watcher.await.unwrap();
    }
}
