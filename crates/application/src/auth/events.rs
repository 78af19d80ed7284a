//! Notifications emitted by the authenticated client.
//!
//! Three delivery paths exist side by side:
//! - a single-slot `on_token_refreshed` callback owned by at most one caller,
//! - observer registrations for refresh success and refresh failure,
//! - a broadcast channel for any number of passive async listeners.
//!
//! All callbacks run synchronously on the task that settled the refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel; slow receivers see `Lagged`.
const CHANNEL_CAPACITY: usize = 32;

/// Event published on the broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A refresh succeeded and this access token is now current.
    TokenRefreshed {
        /// The new access token.
        access_token: String,
    },
    /// Credentials were cleared after a terminal authentication failure.
    RefreshFailed,
}

/// Handle returned by the observer registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type RefreshedCallback = Arc<dyn Fn(&str) + Send + Sync>;
type FailedCallback = Arc<dyn Fn() + Send + Sync>;

enum Observer {
    Refreshed(RefreshedCallback),
    Failed(FailedCallback),
}

/// Fan-out point for refresh notifications.
pub struct AuthEvents {
    on_token_refreshed: Mutex<Option<RefreshedCallback>>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_id: AtomicU64,
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    /// Creates a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            on_token_refreshed: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            sender,
        }
    }

    /// Installs the single-slot refresh callback, replacing any previous one.
    pub fn set_on_token_refreshed(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_token_refreshed.lock() = Some(Arc::new(callback));
    }

    /// Removes the single-slot refresh callback.
    pub fn clear_on_token_refreshed(&self) {
        *self.on_token_refreshed.lock() = None;
    }

    /// Registers an observer for successful refreshes.
    pub fn subscribe_refreshed(
        &self,
        callback: impl Fn(&str) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.register(Observer::Refreshed(Arc::new(callback)))
    }

    /// Registers an observer for terminal refresh failures.
    pub fn subscribe_refresh_failed(
        &self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.register(Observer::Failed(Arc::new(callback)))
    }

    /// Removes an observer. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Returns a receiver for the broadcast channel.
    #[must_use]
    pub fn listen(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn token_refreshed(&self, access_token: &str) {
        let slot = self.on_token_refreshed.lock().clone();
        if let Some(callback) = slot {
            callback(access_token);
        }
        for observer in self.snapshot() {
            if let Observer::Refreshed(callback) = observer {
                callback(access_token);
            }
        }
        // No receivers is not an error.
        let _ = self.sender.send(AuthEvent::TokenRefreshed {
            access_token: access_token.to_string(),
        });
    }

    pub(crate) fn refresh_failed(&self) {
        for observer in self.snapshot() {
            if let Observer::Failed(callback) = observer {
                callback();
            }
        }
        let _ = self.sender.send(AuthEvent::RefreshFailed);
    }

    fn register(&self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, observer));
        id
    }

    // Callbacks may subscribe or unsubscribe, so never call them under the lock.
    fn snapshot(&self) -> Vec<Observer> {
        self.observers
            .lock()
            .iter()
            .map(|(_, observer)| match observer {
                Observer::Refreshed(callback) => Observer::Refreshed(Arc::clone(callback)),
                Observer::Failed(callback) => Observer::Failed(Arc::clone(callback)),
            })
            .collect()
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuthEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEvents")
            .field("observers", &self.observers.lock().len())
            .field("receivers", &self.sender.receiver_count())
            .finish_non_exhaustive()
    }
}
