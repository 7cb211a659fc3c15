pub mod runner;
pub mod trajectory;

pub use runner::AgentRunner;
pub use trajectory::{StepRecord, Trajectory};
