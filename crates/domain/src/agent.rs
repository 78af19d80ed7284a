//! Automation agents: host machines that run a set of emulators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection state of an agent as last reported to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Heartbeating and accepting tasks.
    Online,
    /// Heartbeating but not accepting tasks.
    Busy,
    /// No heartbeat within the backend's window.
    #[default]
    Offline,
}

/// An automation agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Backend identifier
    pub id: String,
    /// Operator-facing name
    pub name: String,
    /// Current status
    #[serde(default)]
    pub status: AgentStatus,
    /// Public tunnel URL, when the agent exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tunnel_url: Option<String>,
    /// Number of emulators registered on the agent
    #[serde(default)]
    pub emulator_count: u32,
    /// Last heartbeat time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl Agent {
    /// Returns true if the agent can be handed new tasks.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.status, AgentStatus::Online)
    }
}
