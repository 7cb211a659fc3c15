pub mod client;
pub mod decision;

pub use client::{ChatModel, ChatTurn, GenaiChat, LlmProvider, Role};
pub use decision::{Decision, DecisionEngine, DecisionError};
