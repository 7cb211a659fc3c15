use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Parameter value types accepted by action specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// One typed, possibly-optional parameter of an action spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub description: String,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            description: description.to_string(),
        }
    }
}

/// The typed template an action must conform to. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ActionSpec {
    pub fn new(name: &str, description: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// One-line rendering for prompt listings: `name(a: string, b?: integer)`
    fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| {
                let opt = if p.required { "" } else { "?" };
                format!("{}{}: {}", p.name, opt, p.kind)
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }
}

/// A concrete instantiation of an [`ActionSpec`] with bound parameters.
///
/// Must pass [`ActionSpace::validate`] before it reaches the session client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Action {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    pub fn bool_param(&self, name: &str) -> Option<bool> {
        self.params.get(name).and_then(Value::as_bool)
    }
}

#[derive(Debug, Error)]
pub enum ActionSpaceError {
    #[error("action '{0}' is already registered")]
    DuplicateAction(String),
}

/// Structured validation failure for a candidate action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("action '{action}' is missing required parameter '{param}'")]
    MissingParameter { action: String, param: String },

    #[error("parameter '{param}' of action '{action}' expects {expected}, got {actual}")]
    TypeMismatch {
        action: String,
        param: String,
        expected: String,
        actual: String,
    },
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Registry of all executable actions.
///
/// Populated once at startup (see [`crate::actions::builtin_space`]) and
/// shared read-only across concurrent runs.
pub struct ActionSpace {
    specs: Vec<ActionSpec>,
    index: HashMap<String, usize>,
}

impl ActionSpace {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn register(&mut self, spec: ActionSpec) -> Result<(), ActionSpaceError> {
        if self.index.contains_key(&spec.name) {
            return Err(ActionSpaceError::DuplicateAction(spec.name));
        }
        self.index.insert(spec.name.clone(), self.specs.len());
        self.specs.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ActionSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Check the action's name and parameters against its spec.
    ///
    /// Parameters not named by the spec are tolerated; LLMs routinely emit
    /// stray keys alongside the required ones.
    pub fn validate(&self, action: &Action) -> Result<(), ValidationError> {
        let Some(spec) = self.get(&action.name) else {
            return Err(ValidationError::UnknownAction(action.name.clone()));
        };
        for param in &spec.params {
            match action.params.get(&param.name) {
                None if param.required => {
                    return Err(ValidationError::MissingParameter {
                        action: spec.name.clone(),
                        param: param.name.clone(),
                    });
                }
                None => {}
                Some(value) => {
                    if !param.kind.matches(value) {
                        return Err(ValidationError::TypeMismatch {
                            action: spec.name.clone(),
                            param: param.name.clone(),
                            expected: param.kind.to_string(),
                            actual: json_type_name(value).to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Order-stable textual listing of every spec, for inclusion in prompts.
    pub fn describe(&self) -> String {
        self.specs
            .iter()
            .map(|spec| format!("- {}: {}", spec.signature(), spec.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn space() -> ActionSpace {
        let mut space = ActionSpace::new();
        space
            .register(ActionSpec::new(
                "fill",
                "Type text into an input",
                vec![
                    ParamSpec::required("id", ParamKind::String, "element id"),
                    ParamSpec::required("value", ParamKind::String, "text to type"),
                ],
            ))
            .unwrap();
        space
            .register(ActionSpec::new(
                "wait",
                "Pause before the next action",
                vec![ParamSpec::optional("ms", ParamKind::Integer, "milliseconds")],
            ))
            .unwrap();
        space
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut space = space();
        let err = space
            .register(ActionSpec::new("fill", "again", vec![]))
            .unwrap_err();
        assert!(matches!(err, ActionSpaceError::DuplicateAction(name) if name == "fill"));
    }

    #[test]
    fn validate_accepts_conforming_action() {
        let action = Action::new("fill")
            .with_param("id", "I4")
            .with_param("value", "hello");
        assert!(space().validate(&action).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_action() {
        let err = space().validate(&Action::new("teleport")).unwrap_err();
        assert_eq!(err, ValidationError::UnknownAction("teleport".to_string()));
    }

    #[test]
    fn validate_rejects_missing_required_parameter() {
        let action = Action::new("fill").with_param("id", "I4");
        let err = space().validate(&action).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingParameter { param, .. } if param == "value"
        ));
    }

    #[test]
    fn validate_rejects_type_mismatch() {
        let action = Action::new("fill")
            .with_param("id", "I4")
            .with_param("value", json!(42));
        let err = space().validate(&action).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch { param, .. } if param == "value"
        ));
    }

    #[test]
    fn validate_checks_optional_parameter_types() {
        let ok = Action::new("wait").with_param("ms", json!(250));
        assert!(space().validate(&ok).is_ok());

        let absent = Action::new("wait");
        assert!(space().validate(&absent).is_ok());

        let bad = Action::new("wait").with_param("ms", "soon");
        assert!(space().validate(&bad).is_err());
    }

    #[test]
    fn validate_tolerates_extra_parameters() {
        let action = Action::new("wait").with_param("note", "stray key");
        assert!(space().validate(&action).is_ok());
    }

    #[test]
    fn describe_is_order_stable() {
        let listing = space().describe();
        let fill = listing.find("fill(").unwrap();
        let wait = listing.find("wait(").unwrap();
        assert!(fill < wait);
        assert_eq!(listing, space().describe());
        assert!(listing.contains("ms?: integer"));
    }
}
