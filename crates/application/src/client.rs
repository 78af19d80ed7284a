//! HTTP client with bearer-token attachment and single-flight token renewal.
//!
//! Every request goes through the same pipeline:
//!
//! 1. The current access token is attached unless the path is on the public
//!    allow-list ([`AuthRoutes::is_public`]).
//! 2. Non-2xx answers become [`ClientError::Status`].
//! 3. A 401 on an original attempt triggers a refresh through the
//!    [`RefreshCoordinator`], after which the request is replayed exactly
//!    once with the new token. Concurrent 401s share one refresh.
//!
//! Terminal failures (refresh rejected, no refresh token, the refresh
//! endpoint itself answering 401) clear the [`TokenStore`] and are reported
//! once through [`AuthEvents`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use farmhand_domain::auth::token_preview;
use farmhand_domain::{ApiRequest, ApiResponse, AuthSession, RefreshRequest};

use crate::auth::{Attempt, AuthEvents, AuthRoutes, RefreshCoordinator, RefreshLease, RefreshTicket};
use crate::error::{ClientError, ClientResult};
use crate::ports::{HttpTransport, TokenStore};

/// Authenticated client over an [`HttpTransport`] and a [`TokenStore`].
///
/// One instance is meant to be shared (behind an `Arc`) by every caller in
/// the process; the refresh state lives in the instance.
pub struct AuthenticatedHttpClient<T, S> {
    transport: Arc<T>,
    store: Arc<S>,
    routes: AuthRoutes,
    coordinator: RefreshCoordinator,
    events: Arc<AuthEvents>,
}

impl<T: HttpTransport, S: TokenStore> AuthenticatedHttpClient<T, S> {
    /// Creates a client using the default auth routes.
    pub fn new(transport: Arc<T>, store: Arc<S>) -> Self {
        Self {
            transport,
            store,
            routes: AuthRoutes::default(),
            coordinator: RefreshCoordinator::new(),
            events: Arc::new(AuthEvents::new()),
        }
    }

    /// Replaces the auth routes and public allow-list.
    #[must_use]
    pub fn with_routes(mut self, routes: AuthRoutes) -> Self {
        self.routes = routes;
        self
    }

    /// Returns the configured auth routes.
    pub const fn routes(&self) -> &AuthRoutes {
        &self.routes
    }

    /// Returns the token store.
    pub const fn token_store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the notification hub.
    pub const fn events(&self) -> &Arc<AuthEvents> {
        &self.events
    }

    /// Returns true while a refresh call is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_refreshing()
    }

    /// Sends a request and returns the 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] for non-2xx answers that could not be
    /// recovered, the refresh error when a required refresh failed, or the
    /// transport error when no response was received.
    pub async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        request.validate()?;
        let token = self.bearer_for(&request);
        let mut attempt = Attempt::original(request, token);
        loop {
            let outcome = self.dispatch(&attempt).await;
            match outcome {
                Err(error) if error.is_unauthorized() => {
                    attempt = self.recover(attempt, error).await?;
                }
                outcome => return outcome,
            }
        }
    }

    /// Sends a request and decodes the JSON body of the 2xx response.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`], plus [`ClientError::Decode`] for bodies that do
    /// not match `R`.
    pub async fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<R> {
        let response = self.send(request).await?;
        Ok(response.json()?)
    }

    /// GETs `path` and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send_json`].
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON answer.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send_json`], plus [`ClientError::Serialization`] if
    /// `body` cannot be encoded.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| ClientError::encode(&e))?;
        self.send_json(ApiRequest::post(path).with_json(body)).await
    }

    fn bearer_for(&self, request: &ApiRequest) -> Option<String> {
        if self.routes.is_public(&request.path) {
            return None;
        }
        let token = self.store.get();
        if token.is_none() {
            debug!(path = %request.path, "no access token stored, sending unauthenticated");
        }
        token
    }

    async fn dispatch(&self, attempt: &Attempt) -> ClientResult<ApiResponse> {
        let outgoing = attempt.outgoing();
        let response = self.transport.send(&outgoing).await?;
        debug!(
            method = %outgoing.method,
            target = %outgoing.target(),
            status = response.status,
            replay = attempt.is_replay(),
            "response received"
        );
        if response.is_success() {
            Ok(response)
        } else {
            Err(ClientError::Status {
                status: response.status,
                message: response.error_message(),
            })
        }
    }

    /// Decides what happens after a 401: a replay attempt, or a final error.
    async fn recover(&self, attempt: Attempt, error: ClientError) -> ClientResult<Attempt> {
        let path = attempt.request().path.as_str();

        if self.routes.is_refresh(path) {
            warn!("refresh endpoint answered 401, clearing credentials");
            self.store.remove();
            self.coordinator.reject_waiting(&error);
            self.events.refresh_failed();
            return Err(error);
        }
        if self.routes.is_public(path) || attempt.is_replay() {
            return Err(error);
        }

        if self.store.get_refresh().is_none() {
            warn!(path, "401 with no refresh token stored, clearing credentials");
            self.store.remove();
            self.events.refresh_failed();
            return Err(error);
        }

        if let Some(current) = self.rotated_token(&attempt) {
            debug!(path, "token rotated while request was in flight, replaying");
            return Ok(attempt.replay(current));
        }

        let token = match self.coordinator.join() {
            RefreshTicket::Waiter(pending) => {
                debug!(path, "refresh in flight, queueing");
                pending.outcome().await?
            }
            RefreshTicket::Leader(lease) => self.lead_or_adopt(lease, &attempt, error).await?,
        };
        debug!(path, "replaying after refresh");
        Ok(attempt.replay(token))
    }

    /// Returns the stored access token when it differs from the one `attempt` carried.
    fn rotated_token(&self, attempt: &Attempt) -> Option<String> {
        self.store
            .get()
            .filter(|current| attempt.token() != Some(current.as_str()))
    }

    /// Runs the refresh as leader, unless a refresh that settled between the
    /// caller's checks and `join` already changed the stored pair.
    ///
    /// A refresh stores the new pair before settling its lease, so the store
    /// read here, after winning leadership, observes every earlier refresh.
    async fn lead_or_adopt(
        &self,
        lease: RefreshLease<'_>,
        attempt: &Attempt,
        error: ClientError,
    ) -> ClientResult<String> {
        if let Some(current) = self.rotated_token(attempt) {
            debug!("pair rotated before leading, reusing it");
            lease.settle(&Ok(current.clone()));
            return Ok(current);
        }
        let Some(refresh_token) = self.store.get_refresh() else {
            // Cleared by a refresh that failed in the meantime; it already reported.
            debug!("credentials cleared before leading, giving up");
            lease.settle(&Err(error.clone()));
            return Err(error);
        };
        self.lead_refresh(lease, &refresh_token).await
    }

    async fn lead_refresh(&self, lease: RefreshLease<'_>, refresh_token: &str) -> ClientResult<String> {
        match self.request_refresh(refresh_token).await {
            Ok(session) => {
                let access_token = session.tokens.access_token;
                self.store
                    .set(&access_token, Some(session.tokens.refresh_token.as_str()));
                let waiters = lease.settle(&Ok(access_token.clone()));
                info!(
                    waiters,
                    token = %token_preview(&access_token),
                    "access token refreshed"
                );
                self.events.token_refreshed(&access_token);
                Ok(access_token)
            }
            Err(error) => {
                self.store.remove();
                let waiters = lease.settle(&Err(error.clone()));
                warn!(%error, waiters, "token refresh failed, credentials cleared");
                self.events.refresh_failed();
                Err(error)
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> ClientResult<AuthSession> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let body = serde_json::to_value(&body).map_err(|e| ClientError::encode(&e))?;
        let request = ApiRequest::post(&self.routes.refresh).with_json(body);
        let response = self.dispatch(&Attempt::original(request, None)).await?;
        Ok(response.json()?)
    }
}

impl<T, S> std::fmt::Debug for AuthenticatedHttpClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedHttpClient")
            .field("routes", &self.routes)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
