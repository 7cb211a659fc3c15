use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::models::{ExecutionResult, Observation};

/// Everything the loop learned and did during one step. Immutable once
/// appended to the trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub observation: Observation,
    /// Rendered perception text shown to the model
    pub perception: String,
    /// Composed step prompt
    pub prompt: String,
    /// Raw decision-maker output, before parsing
    pub raw_decision: String,
    /// Resolved action, absent when the step failed before one was decided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Failure reason when no execution result exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExecutionResult>,
    /// Retries spent by the session client executing the action
    pub execution_retries: u32,
    /// Re-prompts spent getting a usable decision
    pub decision_retries: u32,
    pub recorded_at: DateTime<Utc>,
}

impl StepRecord {
    /// One-line rendering for prompt history windows.
    pub fn summary(&self) -> String {
        match (&self.action, &self.result, &self.failure) {
            (Some(action), Some(result), _) if result.success => format!(
                "action '{}' succeeded: {}",
                action.name,
                short(&result.message)
            ),
            (Some(action), Some(result), _) => format!(
                "action '{}' failed: {}",
                action.name,
                short(&result.message)
            ),
            (Some(action), None, Some(failure)) => {
                format!("action '{}' was not executed: {}", action.name, short(failure))
            }
            (_, _, Some(failure)) => format!("step failed: {}", short(failure)),
            _ => "no action taken".to_string(),
        }
    }
}

const MAX_SUMMARY_LEN: usize = 300;

fn short(message: &str) -> &str {
    let end = message
        .char_indices()
        .nth(MAX_SUMMARY_LEN)
        .map_or(message.len(), |(i, _)| i);
    &message[..end]
}

/// Append-only record of the run, keyed by step index.
///
/// Indices are contiguous from 0; `append` keeps that invariant even if a
/// caller hands in a stale index.
#[derive(Debug, Default)]
pub struct Trajectory {
    steps: Vec<StepRecord>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn next_index(&self) -> usize {
        self.steps.len()
    }

    pub fn append(&mut self, mut record: StepRecord) {
        debug_assert_eq!(record.index, self.steps.len());
        if record.index != self.steps.len() {
            tracing::warn!(
                given = record.index,
                expected = self.steps.len(),
                "correcting out-of-sequence step index"
            );
            record.index = self.steps.len();
        }
        self.steps.push(record);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// The most recent `n` records.
    pub fn window(&self, n: usize) -> &[StepRecord] {
        let start = self.steps.len().saturating_sub(n);
        &self.steps[start..]
    }

    pub fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }
}
