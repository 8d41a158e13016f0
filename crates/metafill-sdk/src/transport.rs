//! HTTP transport: retries and error mapping shared by all endpoints

use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::models::{ApiErrorBody, OAuthErrorBody};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Build the underlying HTTP client
pub(crate) fn http_client(config: &SdkConfig) -> Result<reqwest::Client, SdkError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("metafill/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SdkError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Send a request, retrying 429/5xx and connection failures
///
/// `build` is called once per attempt. Backoff doubles from
/// `retry_base_delay_ms`: 1s, 2s, 4s, etc. with the default config.
pub(crate) async fn send_with_retry<F>(config: &SdkConfig, build: F) -> Result<Response, SdkError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempts = 0;

    loop {
        let error = match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => error_from_response(response).await,
            Err(e) => SdkError::from(e),
        };

        attempts += 1;
        if !error.is_retryable() || attempts >= config.max_retries {
            return Err(error);
        }

        let delay = backoff_delay(config.retry_base_delay_ms, attempts);
        warn!("Request failed (attempt {}/{}): {}; retrying in {:?}", attempts, config.max_retries, error, delay);
        tokio::time::sleep(delay).await;
    }
}

/// Delay before retry number `attempt` (1-based), doubling from `base_ms`
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

/// Map a non-success response to an error
pub(crate) async fn error_from_response(response: Response) -> SdkError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let (code, message) = error_details(status, &body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SdkError::Auth(message),
        StatusCode::NOT_FOUND => SdkError::NotFound(message),
        StatusCode::CONFLICT => SdkError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => SdkError::RateLimited(message),
        _ => SdkError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

/// Provider code and message from an error body
///
/// REST errors carry `{code, message}`; the token endpoint uses
/// `{error, error_description}`. Falls back to the status reason.
fn error_details(status: StatusCode, body: &str) -> (String, String) {
    let fallback = status.canonical_reason().unwrap_or("unknown error").to_string();

    if let Ok(api) = serde_json::from_str::<ApiErrorBody>(body) {
        if !api.code.is_empty() || !api.message.is_empty() {
            let message = if api.message.is_empty() { fallback } else { api.message };
            return (api.code, message);
        }
    }
    if let Ok(oauth) = serde_json::from_str::<OAuthErrorBody>(body) {
        if !oauth.error.is_empty() {
            let message = if oauth.error_description.is_empty() {
                oauth.error.clone()
            } else {
                oauth.error_description
            };
            return (oauth.error, message);
        }
    }

    let message = if body.trim().is_empty() { fallback.clone() } else { body.trim().to_string() };
    (fallback.to_lowercase().replace(' ', "_"), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_details_api_body() {
        let (code, message) = error_details(
            StatusCode::BAD_REQUEST,
            r#"{"type":"error","status":400,"code":"bad_request","message":"Invalid value for amount"}"#,
        );
        assert_eq!(code, "bad_request");
        assert_eq!(message, "Invalid value for amount");
    }

    #[test]
    fn test_error_details_oauth_body() {
        let (code, message) = error_details(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_client","error_description":"The client credentials are invalid"}"#,
        );
        assert_eq!(code, "invalid_client");
        assert_eq!(message, "The client credentials are invalid");
    }

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(100, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(100, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(100, 4), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_delay_saturates() {
        assert_eq!(backoff_delay(1000, 65), Duration::from_millis(u64::MAX));
        assert_eq!(backoff_delay(1000, u32::MAX), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_error_details_plain_body() {
        let (code, message) = error_details(StatusCode::BAD_GATEWAY, "");
        assert_eq!(code, "bad_gateway");
        assert_eq!(message, "Bad Gateway");
    }
}
