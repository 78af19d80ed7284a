//! Verbs of the farm API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Methods the farm API routes accept.
///
/// Reads are `GET`; sign-in, refresh and task-starting actions are `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Reads a resource or listing.
    Get,
    /// Creates a session or starts an action.
    Post,
    /// Replaces a resource.
    Put,
    /// Updates part of a resource.
    Patch,
    /// Deletes a resource.
    Delete,
}

impl HttpMethod {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
