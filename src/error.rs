use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("LLM provider error: {0}")]
    Llm(String),

    #[error("Remote session error: {0}")]
    Session(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::RunNotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration Error"),
            AppError::Llm(_) => (StatusCode::INTERNAL_SERVER_ERROR, "LLM Error"),
            AppError::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Session Error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
