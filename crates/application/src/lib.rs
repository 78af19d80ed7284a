//! Farmhand Application - Ports, the authenticated client and use cases
//!
//! This crate holds the part of the console client that does not touch the
//! network or the filesystem directly: the ports implemented by the
//! infrastructure layer, the bearer-token pipeline with its single-flight
//! refresh, and the use cases built on top of it.

pub mod auth;
pub mod client;
pub mod error;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{AuthEvent, AuthEvents, AuthRoutes, MemoryTokenStore, SubscriptionId};
pub use client::AuthenticatedHttpClient;
pub use error::{ClientError, ClientResult};
pub use ports::{HttpTransport, TokenStore, TransportError};
pub use use_cases::{FarmApi, PollPolicy, SessionService, VerifyAccountLogin};
