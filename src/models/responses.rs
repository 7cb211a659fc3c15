use serde::{Deserialize, Serialize};

use super::run::AgentState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRunResponse {
    pub run_id: String,
}

/// Snapshot returned while a run is live, or the full state once finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatusResponse {
    pub run_id: String,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AgentState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
