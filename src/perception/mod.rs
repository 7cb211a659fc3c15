// Perception - renders an observation for the decision-maker

pub mod plain;
pub mod structured;

pub use plain::PlainPerception;
pub use structured::StructuredPerception;

use std::sync::Arc;

use crate::actions::ActionSpace;
use crate::models::Observation;

/// Where the run currently stands, shown to the model alongside the page.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub current_step: usize,
    pub max_steps: usize,
}

/// Renders an [`Observation`] into text for the decision-maker.
///
/// Implementations must be pure: identical inputs produce identical output,
/// so prompt-based tests stay reproducible.
pub trait Perception: Send + Sync {
    fn format(&self, obs: &Observation, space: &ActionSpace, progress: Progress) -> String;
}

/// Look up a perception variant by its configured name.
pub fn by_name(name: &str) -> Option<Arc<dyn Perception>> {
    match name {
        "structured" => Some(Arc::new(StructuredPerception)),
        "plain" => Some(Arc::new(PlainPerception)),
        _ => None,
    }
}
