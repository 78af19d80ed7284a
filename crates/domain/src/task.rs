//! Queued and executed automation tasks.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::page::PageQuery;

/// Execution state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting in the queue.
    Pending,
    /// Picked up by an agent.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Cancelled before completion.
    Cancelled,
}

impl TaskStatus {
    /// Returns true once the task will not change state again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns the wire name used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(DomainError::UnknownVariant {
                kind: "task status",
                value: s.to_string(),
            }),
        }
    }
}

/// A unit of automation work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Backend identifier
    pub id: String,
    /// Task type (e.g. `verify_login`, `like_post`)
    pub kind: String,
    /// Current state
    pub status: TaskStatus,
    /// Agent executing the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Account the task runs as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Result payload reported by the agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Enqueue time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filter for the task queue listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks in this state
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this agent
    pub agent_id: Option<String>,
    /// Page to fetch
    pub page: PageQuery,
}

impl TaskFilter {
    /// Returns the query-string pairs for this filter.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = self.page.to_query();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.to_string()));
        }
        if let Some(agent_id) = &self.agent_id {
            query.push(("agent_id".to_string(), agent_id.clone()));
        }
        query
    }
}

/// Response of the endpoint that enqueues a login verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStarted {
    /// Task to poll for the verification outcome
    pub task_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_terminal_states() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_parsing_accepts_us_spelling() {
        assert_eq!("canceled".parse::<TaskStatus>().unwrap(), TaskStatus::Cancelled);
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_filter_query() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Failed),
            agent_id: Some("agent-1".to_string()),
            page: PageQuery::new(1, 10),
        };
        let query = filter.to_query();
        assert!(query.contains(&("status".to_string(), "failed".to_string())));
        assert!(query.contains(&("agent_id".to_string(), "agent-1".to_string())));
        assert_eq!(query.len(), 4);
    }

    #[test]
    fn test_task_decodes_minimal_body() {
        let task: Task = serde_json::from_str(
            r#"{"id": "t1", "kind": "verify_login", "status": "running"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.error, None);
    }
}
