use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::trajectory::StepRecord;

/// Why a run ended as `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The decision re-prompt budget for a single step was exhausted
    DecisionExhausted { detail: String },
    /// The decided action failed the defensive re-validation
    InvalidAction { detail: String },
    /// The remote session rejected the action outright
    ExecutionRejected { detail: String },
    /// Transient execution failures exhausted the retry budget
    ExecutionExhausted { attempts: u32, detail: String },
    /// The observation fetch failed after retries
    ObservationFailed { detail: String },
}

/// Why a run ended as `Aborted`. These are expected terminal outcomes,
/// not failures of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    StepBudgetExceeded,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed { reason: FailureReason },
    Aborted { reason: AbortReason },
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// Full record of one agent run: goal, trajectory, and terminal status.
///
/// Owned exclusively by the agent loop while the run is live; returned to
/// the caller exactly once, completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub run_id: String,
    pub goal: String,
    pub session_id: String,
    pub status: RunStatus,
    pub steps: Vec<StepRecord>,
    /// Answer reported by the task-completion action, when one was taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl AgentState {
    pub fn new(goal: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            goal: goal.into(),
            session_id: session_id.into(),
            status: RunStatus::Running,
            steps: Vec::new(),
            answer: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Transition into a terminal status. Transitions are one-way: calling
    /// this on an already-terminal state is a bug and leaves it unchanged.
    pub fn finish(&mut self, status: RunStatus) {
        if self.status.is_terminal() {
            tracing::warn!(run_id = %self.run_id, ?status, "ignoring second terminal transition");
            return;
        }
        debug_assert!(status.is_terminal());
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}
