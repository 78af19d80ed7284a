//! Authentication domain types

mod types;

pub use types::{
    AuthSession, Credentials, RefreshRequest, Registration, TokenPair, User, UserRole,
    token_preview,
};
