use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::trajectory::{StepRecord, Trajectory};
use crate::actions::{Action, ActionSpace};
use crate::config::AgentConfig;
use crate::llm::{ChatTurn, DecisionEngine};
use crate::models::{AbortReason, AgentState, ExecutionResult, FailureReason, Observation, RunStatus};
use crate::perception::{Perception, Progress};
use crate::prompts::{corrective_reprompt, PromptSet};
use crate::session::{ExecutionError, SessionClient};

/// Drives one remote browsing session through the observe-decide-execute
/// loop until the task completes, fails, or the step budget runs out.
///
/// One runner invocation owns one `AgentState`; never run two invocations
/// against the same session concurrently. The runner itself holds only
/// shared read-only collaborators and can be reused across sessions.
pub struct AgentRunner {
    space: Arc<ActionSpace>,
    perception: Arc<dyn Perception>,
    prompts: Arc<dyn PromptSet>,
    engine: DecisionEngine,
    session: SessionClient,
    config: AgentConfig,
}

/// Accumulates the fields of the in-flight step's record.
struct StepDraft {
    index: usize,
    observation: Observation,
    perception: String,
    prompt: String,
}

impl StepDraft {
    fn into_record(
        self,
        raw_decision: String,
        action: Option<Action>,
        failure: Option<String>,
        result: Option<ExecutionResult>,
        execution_retries: u32,
        decision_retries: u32,
    ) -> StepRecord {
        StepRecord {
            index: self.index,
            observation: self.observation,
            perception: self.perception,
            prompt: self.prompt,
            raw_decision,
            action,
            failure,
            result,
            execution_retries,
            decision_retries,
            recorded_at: Utc::now(),
        }
    }
}

impl AgentRunner {
    pub fn new(
        space: Arc<ActionSpace>,
        perception: Arc<dyn Perception>,
        prompts: Arc<dyn PromptSet>,
        engine: DecisionEngine,
        session: SessionClient,
        config: AgentConfig,
    ) -> Self {
        Self {
            space,
            perception,
            prompts,
            engine,
            session,
            config,
        }
    }

    /// Run the loop to completion and return the finished state.
    ///
    /// Every fault is converted into a terminal status; this never raises
    /// out of the loop. Cancellation is observed at step boundaries only,
    /// so an in-flight retry sequence always completes or exhausts first.
    pub async fn run(
        &self,
        goal: &str,
        session_id: &str,
        cancel: CancellationToken,
    ) -> AgentState {
        let run_id = uuid::Uuid::new_v4().to_string();
        self.run_with_id(run_id, goal, session_id, cancel).await
    }

    /// Same as [`run`](Self::run), with a caller-chosen run id.
    pub async fn run_with_id(
        &self,
        run_id: String,
        goal: &str,
        session_id: &str,
        cancel: CancellationToken,
    ) -> AgentState {
        let mut state = AgentState::new(goal, session_id);
        state.run_id = run_id;
        let mut trajectory = Trajectory::new();
        let system = self.prompts.system();
        let task_prompt = self.prompts.task(goal);

        tracing::info!(run_id = %state.run_id, goal, session_id, "starting agent run");

        'steps: for step_index in 0..self.config.max_steps {
            if cancel.is_cancelled() {
                tracing::info!(run_id = %state.run_id, step = step_index, "run cancelled");
                state.finish(RunStatus::Aborted {
                    reason: AbortReason::Cancelled,
                });
                break;
            }

            // Observe the session
            let observation = match self.session.observe(session_id).await {
                Ok(attempted) => attempted.value,
                Err(e) => {
                    tracing::error!(step = step_index, error = %e, "observation fetch failed");
                    state.finish(RunStatus::Failed {
                        reason: FailureReason::ObservationFailed {
                            detail: e.to_string(),
                        },
                    });
                    break;
                }
            };

            // Perceive and compose the step prompt
            let progress = Progress {
                current_step: step_index,
                max_steps: self.config.max_steps,
            };
            let perception = self.perception.format(&observation, &self.space, progress);
            let prompt = if trajectory.is_empty() {
                format!(
                    "{}\n\n{}",
                    self.prompts.empty_trajectory(),
                    self.prompts.step(&perception, trajectory.steps())
                )
            } else {
                self.prompts.step(&perception, trajectory.steps())
            };

            let draft = StepDraft {
                index: step_index,
                observation,
                perception,
                prompt: prompt.clone(),
            };

            // Decide, re-prompting on bad output up to the configured cap
            let mut turns = vec![ChatTurn::user(task_prompt.clone()), ChatTurn::user(prompt)];
            let mut decision_retries = 0u32;
            let decision = loop {
                match self.engine.decide(&system, &turns).await {
                    Ok(decision) => break decision,
                    Err(e) => {
                        if decision_retries >= self.config.max_decision_retries {
                            tracing::error!(
                                step = step_index,
                                retries = decision_retries,
                                error = %e,
                                "decision retries exhausted"
                            );
                            let raw = e.raw().unwrap_or_default().to_string();
                            trajectory.append(draft.into_record(
                                raw,
                                None,
                                Some(e.to_string()),
                                None,
                                0,
                                decision_retries,
                            ));
                            state.finish(RunStatus::Failed {
                                reason: FailureReason::DecisionExhausted {
                                    detail: e.to_string(),
                                },
                            });
                            break 'steps;
                        }
                        decision_retries += 1;
                        tracing::warn!(
                            step = step_index,
                            retry = decision_retries,
                            error = %e,
                            "re-prompting after unusable decision"
                        );
                        // Backend faults carry no reply to correct; retry
                        // with the turns unchanged
                        if let Some(raw) = e.raw() {
                            turns.push(ChatTurn::assistant(raw));
                            turns.push(ChatTurn::user(corrective_reprompt(&e.to_string())));
                        }
                    }
                }
            };

            tracing::info!(
                step = step_index,
                action = %decision.action.name,
                reasoning = decision.reasoning.as_deref().unwrap_or(""),
                "action decided"
            );

            // Defensive re-check before anything reaches the session
            if let Err(e) = self.space.validate(&decision.action) {
                trajectory.append(draft.into_record(
                    decision.raw,
                    Some(decision.action),
                    Some(e.to_string()),
                    None,
                    0,
                    decision_retries,
                ));
                state.finish(RunStatus::Failed {
                    reason: FailureReason::InvalidAction {
                        detail: e.to_string(),
                    },
                });
                break;
            }

            // Execute against the remote session
            match self.session.execute(session_id, &decision.action).await {
                Ok(attempted) => {
                    let result = attempted.value;
                    let goal_reached = result.goal_reached;
                    if goal_reached {
                        state.answer = decision.action.str_param("answer").map(String::from);
                    }
                    trajectory.append(draft.into_record(
                        decision.raw,
                        Some(decision.action),
                        None,
                        Some(result),
                        attempted.retries,
                        decision_retries,
                    ));
                    if goal_reached {
                        tracing::info!(run_id = %state.run_id, step = step_index, "task completed");
                        state.finish(RunStatus::Succeeded);
                        break;
                    }
                }
                Err(ExecutionError::Rejected { status, detail }) => {
                    let failure = format!("rejected (HTTP {status}): {detail}");
                    trajectory.append(draft.into_record(
                        decision.raw,
                        Some(decision.action),
                        Some(failure.clone()),
                        None,
                        0,
                        decision_retries,
                    ));
                    state.finish(RunStatus::Failed {
                        reason: FailureReason::ExecutionRejected { detail: failure },
                    });
                    break;
                }
                Err(ExecutionError::Exhausted {
                    attempts,
                    last_cause,
                }) => {
                    trajectory.append(draft.into_record(
                        decision.raw,
                        Some(decision.action),
                        Some(format!("execution retries exhausted: {last_cause}")),
                        None,
                        attempts,
                        decision_retries,
                    ));
                    state.finish(RunStatus::Failed {
                        reason: FailureReason::ExecutionExhausted {
                            attempts,
                            detail: last_cause,
                        },
                    });
                    break;
                }
            }
        }

        if !state.status.is_terminal() {
            tracing::info!(
                run_id = %state.run_id,
                max_steps = self.config.max_steps,
                "step budget exhausted"
            );
            state.finish(RunStatus::Aborted {
                reason: AbortReason::StepBudgetExceeded,
            });
        }

        state.steps = trajectory.into_steps();
        state
    }
}
