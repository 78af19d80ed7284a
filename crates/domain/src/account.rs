//! Social-media accounts driven by the farm.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Supported social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Instagram
    Instagram,
    /// `YouTube`
    Youtube,
    /// `TikTok`
    Tiktok,
    /// Twitter / X
    Twitter,
}

impl Platform {
    /// Returns the wire name used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Self::Instagram),
            "youtube" => Ok(Self::Youtube),
            "tiktok" => Ok(Self::Tiktok),
            "twitter" | "x" => Ok(Self::Twitter),
            _ => Err(DomainError::UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            }),
        }
    }
}

/// A social account the farm logs into and runs tasks as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAccount {
    /// Backend identifier
    pub id: String,
    /// Platform the account belongs to
    pub platform: Platform,
    /// Login handle
    pub username: String,
    /// Emulator the account is bound to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emulator_id: Option<String>,
    /// Whether the last login verification succeeded
    #[serde(default)]
    pub verified: bool,
}
