//! Farmhand Domain - Core types
//!
//! This crate defines the domain model for the Farmhand console client:
//! the HTTP request/response model the client pipeline passes around,
//! authentication tokens and users, and the farm resources (agents,
//! emulators, tasks, social accounts) exposed by the backend.
//! All types here are pure Rust with no I/O dependencies.

pub mod account;
pub mod agent;
pub mod auth;
pub mod emulator;
pub mod error;
pub mod page;
pub mod request;
pub mod response;
pub mod task;

pub use account::{Platform, SocialAccount};
pub use agent::{Agent, AgentStatus};
pub use auth::{AuthSession, Credentials, RefreshRequest, Registration, TokenPair, User, UserRole};
pub use emulator::{Emulator, EmulatorStatus};
pub use error::{DomainError, DomainResult};
pub use page::{Page, PageQuery};
pub use request::{ApiRequest, Header, Headers, HttpMethod};
pub use response::ApiResponse;
pub use task::{Task, TaskFilter, TaskStatus, VerificationStarted};
