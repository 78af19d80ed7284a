//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod token_store;
mod transport;

pub use token_store::TokenStore;
pub use transport::{HttpTransport, TransportError};
