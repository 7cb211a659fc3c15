use anyhow::{anyhow, Result};
use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatRequest, ChatResponse};
use genai::Client;
use serde::{Deserialize, Serialize};

/// LLM provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    OpenAI,
    Gemini,
}

impl LlmProvider {
    /// Get the environment variable name for the API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::Gemini => "gemini-2.5-flash",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "openai" | "gpt" => Ok(LlmProvider::OpenAI),
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            _ => Err(anyhow!("Unknown LLM provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation sent to the decision-maker.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Language-model backend: prompt in, free-form text out.
///
/// No contract on internal behavior beyond "eventually returns or errors".
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String>;
}

/// genai-backed [`ChatModel`].
///
/// genai 0.4+ auto-detects the provider from the model name prefix
/// (gemini-, gpt-, claude-) and reads the key from the provider's env var.
pub struct GenaiChat {
    client: Client,
    model: String,
}

impl GenaiChat {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatModel for GenaiChat {
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        let mut messages = vec![ChatMessage::system(system)];
        for turn in turns {
            messages.push(match turn.role {
                Role::User => ChatMessage::user(&turn.content),
                Role::Assistant => ChatMessage::assistant(&turn.content),
            });
        }

        let request = ChatRequest::new(messages);
        let response: ChatResponse = self
            .client
            .exec_chat(&self.model, request, None)
            .await
            .map_err(|e| anyhow!("LLM request failed: {}", e))?;

        let text = response
            .first_text()
            .ok_or_else(|| anyhow!("No text in LLM response"))?
            .to_string();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_str() {
        assert_eq!(
            "anthropic".parse::<LlmProvider>().unwrap(),
            LlmProvider::Anthropic
        );
        assert_eq!("gpt".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!(
            "google".parse::<LlmProvider>().unwrap(),
            LlmProvider::Gemini
        );
        assert!("llama".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn provider_key_env_vars() {
        assert_eq!(LlmProvider::Anthropic.api_key_env_var(), "ANTHROPIC_API_KEY");
        assert_eq!(LlmProvider::OpenAI.api_key_env_var(), "OPENAI_API_KEY");
        assert_eq!(LlmProvider::Gemini.api_key_env_var(), "GEMINI_API_KEY");
    }
}
