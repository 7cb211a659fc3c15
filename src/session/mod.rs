// Remote session client - executes validated actions with retry/backoff

pub mod client;
pub mod http;
pub mod retry;

pub use client::{ApiFailure, Attempted, ExecutionError, SessionApi, SessionClient};
pub use http::HttpSessionApi;
pub use retry::RetryPolicy;
