use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::client::{ChatModel, ChatTurn};
use crate::actions::{Action, ActionSpace};

/// Why the decision-maker's reply could not be turned into an action.
///
/// These are not retried here; the agent loop owns the re-prompt budget.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("could not parse decision: {detail}")]
    ParseFailure { detail: String, raw: String },

    #[error("decided action is invalid: {detail}")]
    ValidationFailure { detail: String, raw: String },

    #[error("LLM backend error: {detail}")]
    Backend { detail: String },
}

impl DecisionError {
    /// The verbatim model output behind this error, when one exists.
    pub fn raw(&self) -> Option<&str> {
        match self {
            DecisionError::ParseFailure { raw, .. }
            | DecisionError::ValidationFailure { raw, .. } => Some(raw),
            DecisionError::Backend { .. } => None,
        }
    }
}

/// A parsed, validated decision. The engine only selects an action; it
/// never executes one.
#[derive(Debug, Clone)]
pub struct Decision {
    pub reasoning: Option<String>,
    pub action: Action,
    /// Verbatim model output, kept for the step record
    pub raw: String,
}

#[derive(Deserialize)]
struct ModelReply {
    #[serde(default)]
    reasoning: Option<String>,
    action: ReplyAction,
}

#[derive(Deserialize)]
struct ReplyAction {
    name: String,
    #[serde(default)]
    params: Map<String, Value>,
}

/// Turns composed prompts into validated actions via the LLM backend.
pub struct DecisionEngine {
    model: Arc<dyn ChatModel>,
    space: Arc<ActionSpace>,
}

impl DecisionEngine {
    pub fn new(model: Arc<dyn ChatModel>, space: Arc<ActionSpace>) -> Self {
        Self { model, space }
    }

    pub async fn decide(
        &self,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<Decision, DecisionError> {
        let raw = self
            .model
            .complete(system, turns)
            .await
            .map_err(|e| DecisionError::Backend {
                detail: e.to_string(),
            })?;

        let json = extract_json(&raw).ok_or_else(|| DecisionError::ParseFailure {
            detail: "no JSON object found in the reply".to_string(),
            raw: raw.clone(),
        })?;

        let reply: ModelReply =
            serde_json::from_str(json).map_err(|e| DecisionError::ParseFailure {
                detail: e.to_string(),
                raw: raw.clone(),
            })?;

        let action = Action {
            name: reply.action.name,
            params: reply.action.params,
        };
        self.space
            .validate(&action)
            .map_err(|e| DecisionError::ValidationFailure {
                detail: e.to_string(),
                raw: raw.clone(),
            })?;

        Ok(Decision {
            reasoning: reply.reasoning,
            action,
            raw,
        })
    }
}

/// Slice out the JSON object from a reply that may wrap it in code fences
/// or surrounding prose.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::builtin_space;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted backend: pops replies front-to-back.
    struct ScriptedModel {
        replies: Mutex<Vec<anyhow::Result<String>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<anyhow::Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, _system: &str, _turns: &[ChatTurn]) -> anyhow::Result<String> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(anyhow!("script exhausted"));
            }
            replies.remove(0)
        }
    }

    fn engine(replies: Vec<anyhow::Result<String>>) -> DecisionEngine {
        DecisionEngine::new(
            Arc::new(ScriptedModel::new(replies)),
            Arc::new(builtin_space()),
        )
    }

    #[tokio::test]
    async fn parses_plain_json_reply() {
        let reply = r#"{"reasoning": "go there", "action": {"name": "goto", "params": {"url": "https://example.com"}}}"#;
        let decision = engine(vec![Ok(reply.to_string())])
            .decide("sys", &[ChatTurn::user("step")])
            .await
            .unwrap();
        assert_eq!(decision.action.name, "goto");
        assert_eq!(decision.action.str_param("url"), Some("https://example.com"));
        assert_eq!(decision.reasoning.as_deref(), Some("go there"));
    }

    #[tokio::test]
    async fn parses_fenced_and_prose_wrapped_reply() {
        let reply = "Sure, here is my decision:\n```json\n{\"action\": {\"name\": \"scrape\", \"params\": {}}}\n```\nLet me know.";
        let decision = engine(vec![Ok(reply.to_string())])
            .decide("sys", &[ChatTurn::user("step")])
            .await
            .unwrap();
        assert_eq!(decision.action.name, "scrape");
        assert!(decision.raw.contains("```json"));
    }

    #[tokio::test]
    async fn garbage_reply_is_parse_failure() {
        let err = engine(vec![Ok("I would click the button".to_string())])
            .decide("sys", &[ChatTurn::user("step")])
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::ParseFailure { .. }));
    }

    #[tokio::test]
    async fn unknown_action_is_validation_failure() {
        let reply = r#"{"action": {"name": "teleport", "params": {}}}"#;
        let err = engine(vec![Ok(reply.to_string())])
            .decide("sys", &[ChatTurn::user("step")])
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::ValidationFailure { .. }));
    }

    #[tokio::test]
    async fn missing_parameter_is_validation_failure() {
        let reply = r#"{"action": {"name": "click", "params": {}}}"#;
        let err = engine(vec![Ok(reply.to_string())])
            .decide("sys", &[ChatTurn::user("step")])
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::ValidationFailure { .. }));
    }

    #[tokio::test]
    async fn backend_error_surfaces() {
        let err = engine(vec![Err(anyhow!("connection reset"))])
            .decide("sys", &[ChatTurn::user("step")])
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::Backend { .. }));
    }
}
