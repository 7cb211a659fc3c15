use super::{Perception, Progress};
use crate::actions::ActionSpace;
use crate::models::Observation;

/// Plain descriptive rendering of the page state.
pub struct PlainPerception;

impl Perception for PlainPerception {
    fn format(&self, obs: &Observation, space: &ActionSpace, progress: Progress) -> String {
        let data_section = match &obs.data {
            Some(data) => format!(
                "\nData extracted from the current page:\n```json\n{}\n```\n",
                serde_json::to_string(data).unwrap_or_default()
            ),
            None => String::new(),
        };
        format!(
            "* Current url: {url}\n\
             * Current page title: {title}\n\
             * Current step: {step}/{max}\n\
             \n\
             [Interaction elements and context]\n\
             {elements}\n\
             {data_section}\n\
             [Available actions]\n\
             {actions}",
            url = obs.url,
            title = obs.title,
            step = progress.current_step,
            max = progress.max_steps,
            elements = obs.elements,
            data_section = data_section,
            actions = space.describe(),
        )
    }
}
