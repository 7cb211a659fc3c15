use std::env;
use std::sync::Mutex;

use crate::error::AppError;
use crate::llm::LlmProvider;

/// Server bind configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8791),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8791,
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Remote session API endpoint and credentials
#[derive(Debug, Clone)]
pub struct RemoteApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl RemoteApiConfig {
    /// Read the remote session API settings from the environment.
    ///
    /// A missing URL or key is a configuration error surfaced before any
    /// agent run starts. It is never retried.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url = env::var("SESSION_API_URL")
            .map_err(|_| AppError::Config("SESSION_API_URL is not set".to_string()))?;
        let api_key = env::var("SESSION_API_KEY")
            .map_err(|_| AppError::Config("SESSION_API_KEY is not set".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(AppError::Config("SESSION_API_KEY is empty".to_string()));
        }
        let timeout_ms = env::var("SESSION_API_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_ms,
        })
    }
}

/// LLM backend selection
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
}

impl LlmSettings {
    /// Read provider/model from the environment and verify the provider's
    /// API key is present. Fails fast, before any loop iteration.
    pub fn from_env() -> Result<Self, AppError> {
        let provider: LlmProvider = env::var("LLM_PROVIDER")
            .unwrap_or_else(|_| "anthropic".to_string())
            .parse()
            .map_err(|e: anyhow::Error| AppError::Config(e.to_string()))?;
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| provider.default_model().to_string());

        let key_var = provider.api_key_env_var();
        match env::var(key_var) {
            Ok(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(AppError::Config(format!(
                    "{key_var} is not set for LLM provider {provider:?}"
                )))
            }
        }
        Ok(Self { provider, model })
    }
}

/// Knobs for a single agent run
#[derive(Debug, Clone, Copy)]
pub struct AgentConfig {
    /// Caps loop iterations
    pub max_steps: usize,
    /// Caps re-prompts after a bad LLM decision within one step
    pub max_decision_retries: u32,
    /// Number of prior steps included in step prompts
    pub trajectory_window: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 25,
            max_decision_retries: 3,
            trajectory_window: 5,
        }
    }
}

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Set an API key env var without racing concurrent setters.
pub fn set_api_key_env(var: &str, value: &str) {
    let _guard = ENV_LOCK.lock().unwrap();
    env::set_var(var, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_steps, 25);
        assert_eq!(config.max_decision_retries, 3);
        assert_eq!(config.trajectory_window, 5);
    }

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8791);
        assert_eq!(config.host, "127.0.0.1");
    }
}
