use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::actions::ActionSpace;
use crate::agent::AgentRunner;
use crate::config::AgentConfig;
use crate::error::AppError;
use crate::llm::{ChatModel, DecisionEngine};
use crate::models::{AgentState, StartRunRequest};
use crate::perception;
use crate::prompts::{TemplatePrompts, TemplateStore};
use crate::session::{RetryPolicy, SessionApi, SessionClient};

/// One agent run tracked by the server.
pub struct RunHandle {
    pub goal: String,
    pub session_id: String,
    pub cancel: CancellationToken,
    /// Parked final state once the loop returns
    pub finished: Arc<RwLock<Option<AgentState>>>,
}

/// Builds a runner per run so request-level overrides (step budget, retry
/// caps, trajectory window) apply without touching shared state.
pub struct RunnerFactory {
    pub space: Arc<ActionSpace>,
    pub templates: Arc<TemplateStore>,
    pub model: Arc<dyn ChatModel>,
    pub session_api: Arc<dyn SessionApi>,
    pub perception_variant: String,
    pub prompt_variant: String,
    pub agent: AgentConfig,
    pub retry: RetryPolicy,
}

impl RunnerFactory {
    pub fn build(&self, request: &StartRunRequest) -> Result<AgentRunner, AppError> {
        let mut agent = self.agent;
        if let Some(v) = request.max_steps {
            agent.max_steps = v;
        }
        if let Some(v) = request.max_decision_retries {
            agent.max_decision_retries = v;
        }
        if let Some(v) = request.trajectory_window {
            agent.trajectory_window = v;
        }
        let retry = match request.max_execution_retries {
            Some(n) => self.retry.with_max_attempts(n),
            None => self.retry,
        };

        let perception = perception::by_name(&self.perception_variant).ok_or_else(|| {
            AppError::Config(format!(
                "unknown perception variant '{}'",
                self.perception_variant
            ))
        })?;
        let prompts = TemplatePrompts::new(
            Arc::clone(&self.templates),
            &self.prompt_variant,
            &self.space,
            agent.trajectory_window,
        )
        .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(AgentRunner::new(
            Arc::clone(&self.space),
            perception,
            Arc::new(prompts),
            DecisionEngine::new(Arc::clone(&self.model), Arc::clone(&self.space)),
            SessionClient::new(Arc::clone(&self.session_api), retry),
            agent,
        ))
    }
}

/// Shared application state
pub struct AppState {
    /// All runs started by this server: run_id -> handle
    pub runs: DashMap<String, RunHandle>,
    pub factory: RunnerFactory,
}

impl AppState {
    pub fn new(factory: RunnerFactory) -> Self {
        Self {
            runs: DashMap::new(),
            factory,
        }
    }
}
