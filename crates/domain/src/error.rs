//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A request path is not relative to the API root.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// A header name is empty or contains characters not allowed in a token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A value could not be parsed into a known enumeration.
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// What was being parsed (e.g. "platform").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// An identifier is invalid or empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Rejects empty or whitespace-only identifiers used in resource paths.
///
/// # Errors
///
/// Returns [`DomainError::InvalidIdentifier`] if the id is blank or contains `/`.
pub fn validate_id(id: &str) -> DomainResult<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(DomainError::InvalidIdentifier(id.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id(" agent-7 "), Ok("agent-7"));
        assert!(validate_id("   ").is_err());
        assert!(validate_id("a/b").is_err());
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = DomainError::UnknownVariant {
            kind: "platform",
            value: "myspace".to_string(),
        };
        assert_eq!(err.to_string(), "unknown platform: myspace");
    }
}
