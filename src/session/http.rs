use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use super::client::{ApiFailure, SessionApi};
use crate::actions::Action;
use crate::config::RemoteApiConfig;
use crate::error::AppError;
use crate::models::{ExecutionResult, Observation};

/// reqwest-backed transport to the remote session API.
pub struct HttpSessionApi {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSessionApi {
    pub fn new(config: &RemoteApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, session_id: &str, resource: &str) -> String {
        format!("{}/sessions/{}/{}", self.base_url, session_id, resource)
    }

    fn classify_send_error(e: reqwest::Error) -> ApiFailure {
        if e.is_timeout() {
            ApiFailure::Timeout
        } else {
            ApiFailure::Transport(e.to_string())
        }
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, ApiFailure> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiFailure::Transport(format!("invalid response body: {e}")));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Err(ApiFailure::RateLimited { retry_after_ms });
        }
        let detail = response.text().await.unwrap_or_default();
        Err(ApiFailure::Http {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn fetch_observation(&self, session_id: &str) -> Result<Observation, ApiFailure> {
        let response = self
            .http
            .get(self.url(session_id, "observation"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Self::classify_send_error)?;
        Self::handle(response).await
    }

    async fn execute_action(
        &self,
        session_id: &str,
        action: &Action,
    ) -> Result<ExecutionResult, ApiFailure> {
        let response = self
            .http
            .post(self.url(session_id, "actions"))
            .bearer_auth(&self.api_key)
            .json(action)
            .send()
            .await
            .map_err(Self::classify_send_error)?;
        Self::handle(response).await
    }
}

/// Parse a `Retry-After` header: either seconds or an HTTP-date.
fn parse_retry_after(value: &str) -> Option<u64> {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Some(seconds * 1000);
    }
    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value) {
        let delay_ms = date
            .signed_duration_since(chrono::Utc::now())
            .num_milliseconds();
        return Some(delay_ms.max(0) as u64);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_seconds() {
        assert_eq!(parse_retry_after("120"), Some(120_000));
        assert_eq!(parse_retry_after("0"), Some(0));
        assert_eq!(parse_retry_after(" 2 "), Some(2000));
    }

    #[test]
    fn retry_after_invalid() {
        assert_eq!(parse_retry_after("not-a-number"), None);
        assert_eq!(parse_retry_after(""), None);
    }

    #[test]
    fn retry_after_http_date() {
        use chrono::{Duration as ChronoDuration, Utc};
        let future = (Utc::now() + ChronoDuration::seconds(90)).to_rfc2822();
        let parsed = parse_retry_after(&future).unwrap();
        assert!(parsed > 80_000 && parsed <= 90_000);

        let past = (Utc::now() - ChronoDuration::seconds(90)).to_rfc2822();
        assert_eq!(parse_retry_after(&past), Some(0));
    }
}
