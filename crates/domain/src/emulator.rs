//! Android emulators hosted by agents.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmulatorStatus {
    /// Booted and idle.
    Running,
    /// Executing a task.
    Busy,
    /// Powered off.
    #[default]
    Stopped,
    /// Crashed or unreachable.
    Error,
}

/// An emulator instance on an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emulator {
    /// Backend identifier
    pub id: String,
    /// Owning agent
    pub agent_id: String,
    /// Emulator name on the agent (e.g. `emulator-5554`)
    pub name: String,
    /// Current state
    #[serde(default)]
    pub status: EmulatorStatus,
    /// Social account bound to this emulator, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}
