use serde::{Deserialize, Serialize};

/// Request body for starting an agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunRequest {
    /// Natural-language task the agent should accomplish
    pub goal: String,
    /// Remote browsing session to drive
    pub session_id: String,
    /// Override the loop iteration cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
    /// Override the per-step decision re-prompt cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_decision_retries: Option<u32>,
    /// Override the execution retry attempt cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_execution_retries: Option<u32>,
    /// Override how many prior steps are included in prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory_window: Option<usize>,
}
