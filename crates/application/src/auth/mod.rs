//! Authentication building blocks for the HTTP client.
//!
//! This module provides:
//! - In-memory token storage
//! - Auth routes and the public allow-list
//! - The single-flight refresh coordinator
//! - Refresh notifications (callback, observers, broadcast)

mod attempt;
mod coordinator;
mod events;
mod routes;
mod token_store;

pub use attempt::{Attempt, AttemptKind};
pub use coordinator::{
    PendingRefresh, RefreshCoordinator, RefreshLease, RefreshOutcome, RefreshTicket,
};
pub use events::{AuthEvent, AuthEvents, SubscriptionId};
pub use routes::AuthRoutes;
pub use token_store::MemoryTokenStore;
