use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::retry::RetryPolicy;
use crate::actions::Action;
use crate::models::{ExecutionResult, Observation};

/// Classified failure from one attempt against the remote session API.
#[derive(Debug, Clone, Error)]
pub enum ApiFailure {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },
}

impl ApiFailure {
    /// Transient failures are expected to resolve on retry: timeouts,
    /// transport faults, rate limiting, and server-side 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiFailure::Timeout | ApiFailure::Transport(_) | ApiFailure::RateLimited { .. } => true,
            ApiFailure::Http { status, .. } => *status >= 500,
        }
    }
}

/// Raw transport to the remote session API, one network call per method.
///
/// Retry and classification live above this seam, in [`SessionClient`].
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn fetch_observation(&self, session_id: &str) -> Result<Observation, ApiFailure>;
    async fn execute_action(
        &self,
        session_id: &str,
        action: &Action,
    ) -> Result<ExecutionResult, ApiFailure>;
}

/// Remote call failure after the retry policy has run its course.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Non-transient rejection; surfaced immediately, never retried
    #[error("remote session rejected the call (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// Transient failures exhausted the attempt budget
    #[error("retries exhausted after {attempts} attempts: {last_cause}")]
    Exhausted { attempts: u32, last_cause: String },
}

/// A successful call plus how many retries it cost.
#[derive(Debug, Clone)]
pub struct Attempted<T> {
    pub value: T,
    pub retries: u32,
}

/// Session API wrapper applying the retry policy to every call.
///
/// The remote session may have mutated even when a failure is reported
/// (an action can be partially applied); callers must treat whatever the
/// next observation shows as the truth, never assume rollback.
#[derive(Clone)]
pub struct SessionClient {
    api: Arc<dyn SessionApi>,
    policy: RetryPolicy,
}

impl SessionClient {
    pub fn new(api: Arc<dyn SessionApi>, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn observe(
        &self,
        session_id: &str,
    ) -> Result<Attempted<Observation>, ExecutionError> {
        self.call(|| self.api.fetch_observation(session_id)).await
    }

    pub async fn execute(
        &self,
        session_id: &str,
        action: &Action,
    ) -> Result<Attempted<ExecutionResult>, ExecutionError> {
        self.call(|| self.api.execute_action(session_id, action))
            .await
    }

    async fn call<T, F, Fut>(&self, attempt_fn: F) -> Result<Attempted<T>, ExecutionError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match attempt_fn().await {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        retries: attempt - 1,
                    })
                }
                Err(ApiFailure::Http { status, detail }) if status < 500 => {
                    return Err(ExecutionError::Rejected { status, detail });
                }
                Err(failure) => {
                    if attempt >= self.policy.max_attempts {
                        return Err(ExecutionError::Exhausted {
                            attempts: attempt,
                            last_cause: failure.to_string(),
                        });
                    }
                    let mut delay = self.policy.delay_for(attempt - 1);
                    // A server-provided Retry-After wins over a shorter backoff
                    if let ApiFailure::RateLimited {
                        retry_after_ms: Some(ms),
                    } = failure
                    {
                        delay = delay.max(Duration::from_millis(ms));
                    }
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "transient session API failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
