//! Farmhand Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading and
//! tracing setup for the binary.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;
pub mod telemetry;

pub use adapters::{DEFAULT_TIMEOUT, ReqwestTransport};
pub use crate::config::{ClientConfig, ConfigError};
pub use persistence::{FileTokenStore, TokenFileError};
pub use serialization::{SerializationError, from_json_bytes, to_json_pretty};
pub use telemetry::init_tracing;
