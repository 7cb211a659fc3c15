//! webpilot - autonomous web agent driving remote browser sessions.
//!
//! The core is the agent decision loop: observe the remote session, render
//! the page for the LLM, compose prompts from templates and trajectory
//! history, parse the decision into a typed action, validate it, execute it
//! through the session API with retry, and record the step. The loop owns
//! termination: success, failure, step budget, or cancellation.

pub mod actions;
pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod perception;
pub mod prompts;
pub mod session;
