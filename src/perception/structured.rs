use super::{Perception, Progress};
use crate::actions::ActionSpace;
use crate::models::Observation;

/// Tag-delimited rendering of the page state.
pub struct StructuredPerception;

impl Perception for StructuredPerception {
    fn format(&self, obs: &Observation, space: &ActionSpace, progress: Progress) -> String {
        let mut parts = vec![format!(
            "<browser_state>\nURL: {}\nTitle: {}\nStep: {}/{}\n\nInteractive Elements:\n{}\n</browser_state>",
            obs.url, obs.title, progress.current_step, progress.max_steps, obs.elements
        )];

        if let Some(data) = &obs.data {
            parts.push(format!(
                "<extracted_data>\n{}\n</extracted_data>",
                serde_json::to_string_pretty(data).unwrap_or_default()
            ));
        }

        parts.push(format!(
            "<available_actions>\n{}\n</available_actions>",
            space.describe()
        ));

        parts.join("\n\n")
    }
}
