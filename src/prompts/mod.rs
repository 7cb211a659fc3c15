// Prompt composition - named templates rendered per step

mod templates;

use std::sync::Arc;

use minijinja::{context, Environment};
use thiserror::Error;

use crate::actions::ActionSpace;
use crate::agent::trajectory::StepRecord;

#[derive(Debug, Error)]
pub enum PromptError {
    /// A required template resource is absent. Fatal for the whole agent
    /// run, never retried.
    #[error("prompt template '{0}' not found")]
    TemplateMissing(String),

    #[error("prompt template '{name}' failed to compile: {source}")]
    TemplateInvalid {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Named, startup-registered prompt templates.
#[derive(Debug)]
pub struct TemplateStore {
    env: Environment<'static>,
}

impl TemplateStore {
    /// Build the store with the built-in templates. Compilation failures
    /// are startup-fatal.
    pub fn with_builtins() -> Result<Self, PromptError> {
        let mut env = Environment::new();
        for (name, source) in templates::BUILTIN_TEMPLATES {
            env.add_template_owned((*name).to_string(), (*source).to_string())
                .map_err(|source| PromptError::TemplateInvalid {
                    name: (*name).to_string(),
                    source,
                })?;
        }
        Ok(Self { env })
    }

    /// Register an additional template, e.g. a custom agent variant.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), PromptError> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|source| PromptError::TemplateInvalid {
                name: name.to_string(),
                source,
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, PromptError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|_| PromptError::TemplateMissing(name.to_string()))?;
        template.render(ctx).map_err(|source| PromptError::TemplateInvalid {
            name: name.to_string(),
            source,
        })
    }
}

/// The four prompt operations the loop needs.
///
/// Concrete variants are selected via configuration (template variant
/// name), not subclassing.
pub trait PromptSet: Send + Sync {
    fn system(&self) -> String;
    fn task(&self, goal: &str) -> String;
    fn step(&self, perception: &str, history: &[StepRecord]) -> String;
    fn empty_trajectory(&self) -> String;
}

/// Template-backed [`PromptSet`].
///
/// Resolves all four templates of its variant at construction so a missing
/// resource fails the run before the first loop iteration.
#[derive(Debug)]
pub struct TemplatePrompts {
    store: Arc<TemplateStore>,
    variant: String,
    /// Pre-rendered action listing; the space is immutable after startup
    actions: String,
    window: usize,
}

const OPERATIONS: [&str; 4] = ["system", "task", "step", "empty_trajectory"];

impl TemplatePrompts {
    pub fn new(
        store: Arc<TemplateStore>,
        variant: &str,
        space: &ActionSpace,
        window: usize,
    ) -> Result<Self, PromptError> {
        for op in OPERATIONS {
            let name = format!("{variant}/{op}");
            if !store.contains(&name) {
                return Err(PromptError::TemplateMissing(name));
            }
        }
        Ok(Self {
            store,
            variant: variant.to_string(),
            actions: space.describe(),
            window,
        })
    }

    fn render(&self, op: &str, ctx: minijinja::Value) -> String {
        let name = format!("{}/{op}", self.variant);
        match self.store.render(&name, ctx) {
            Ok(text) => text,
            // Existence and syntax were checked at construction; render
            // errors here can only come from the context values.
            Err(e) => {
                tracing::error!(template = %name, error = %e, "prompt render failed");
                String::new()
            }
        }
    }
}

impl PromptSet for TemplatePrompts {
    fn system(&self) -> String {
        self.render("system", context! { actions => self.actions })
    }

    fn task(&self, goal: &str) -> String {
        self.render("task", context! { goal => goal })
    }

    fn step(&self, perception: &str, history: &[StepRecord]) -> String {
        let start = history.len().saturating_sub(self.window);
        let recent = &history[start..];
        let history_text = if recent.is_empty() {
            "None yet.".to_string()
        } else {
            recent
                .iter()
                .map(|record| format!("{}. {}", record.index + 1, record.summary()))
                .collect::<Vec<_>>()
                .join("\n")
        };
        self.render(
            "step",
            context! { perception => perception, history => history_text },
        )
    }

    fn empty_trajectory(&self) -> String {
        self.render("empty_trajectory", context! {})
    }
}

/// Corrective line appended when the previous decision could not be used.
pub fn corrective_reprompt(detail: &str) -> String {
    format!(
        "Your previous reply could not be used: {detail}\n\
         Respond again with a single valid JSON object in the required format."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::builtin_space;

    fn prompts(variant: &str, window: usize) -> TemplatePrompts {
        let store = Arc::new(TemplateStore::with_builtins().unwrap());
        TemplatePrompts::new(store, variant, &builtin_space(), window).unwrap()
    }

    #[test]
    fn missing_variant_fails_at_construction() {
        let store = Arc::new(TemplateStore::with_builtins().unwrap());
        let err = TemplatePrompts::new(store, "nonexistent", &builtin_space(), 5).unwrap_err();
        assert!(matches!(err, PromptError::TemplateMissing(name) if name == "nonexistent/system"));
    }

    #[test]
    fn system_prompt_lists_actions() {
        let text = prompts("default", 5).system();
        assert!(text.contains("goto(url: string)"));
        assert!(text.contains("complete(success: boolean, answer: string)"));
        assert!(text.contains("valid JSON"));
    }

    #[test]
    fn task_prompt_embeds_goal() {
        let text = prompts("default", 5).task("open the settings page");
        assert!(text.contains("open the settings page"));
    }

    #[test]
    fn step_prompt_windows_history() {
        use crate::agent::trajectory::Trajectory;
        use crate::models::ExecutionResult;
        use crate::{actions::Action, models::Observation};
        use chrono::Utc;

        let mut trajectory = Trajectory::new();
        for i in 0..4 {
            trajectory.append(crate::agent::trajectory::StepRecord {
                index: i,
                observation: Observation {
                    seq: i as u64,
                    url: String::new(),
                    title: String::new(),
                    elements: String::new(),
                    data: None,
                    captured_at: Utc::now(),
                },
                perception: String::new(),
                prompt: String::new(),
                raw_decision: String::new(),
                action: Some(Action::new("click").with_param("id", format!("B{i}"))),
                failure: None,
                result: Some(ExecutionResult::success(format!("clicked B{i}"))),
                execution_retries: 0,
                decision_retries: 0,
                recorded_at: Utc::now(),
            });
        }

        let text = prompts("default", 2).step("<page/>", trajectory.steps());
        assert!(text.contains("clicked B2"));
        assert!(text.contains("clicked B3"));
        assert!(!text.contains("clicked B0"));
        assert!(text.contains("<page/>"));
    }

    #[test]
    fn empty_history_renders_placeholder() {
        let text = prompts("default", 5).step("<page/>", &[]);
        assert!(text.contains("None yet."));
    }

    #[test]
    fn cautious_variant_selectable() {
        let text = prompts("cautious", 5).system();
        assert!(text.contains("careful browser automation agent"));
    }
}
