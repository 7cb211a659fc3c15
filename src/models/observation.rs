use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of remote session state at a point in time.
///
/// Produced by the remote session API and never mutated by the agent. The
/// sequence number increases monotonically within one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub seq: u64,
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Indexed listing of interactive elements, rendered by the session
    #[serde(default)]
    pub elements: String,
    /// Data extracted from the page by the last action, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub captured_at: DateTime<Utc>,
}

/// Outcome of executing one action against the remote session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Set by the session when the task-completion action was acknowledged
    #[serde(default)]
    pub goal_reached: bool,
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            goal_reached: false,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            goal_reached: false,
        }
    }

    pub fn done(message: impl Into<String>, success: bool) -> Self {
        Self {
            success,
            message: message.into(),
            data: None,
            goal_reached: true,
        }
    }
}
