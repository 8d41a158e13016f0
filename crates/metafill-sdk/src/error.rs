//! Error types for the Box SDK.

use thiserror::Error;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Authentication or authorization error (HTTP 401/403, token exchange)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Connection error (network, DNS, timeout)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Provider returned an error response
    #[error("API error (HTTP {status}): {code}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error code (`bad_request`, `tuple_already_exists`, ...)
        code: String,
        /// Provider message
        message: String,
    },

    /// Item, template or metadata instance does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Too many requests; retries exhausted
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SdkError {
    /// Whether the request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::RateLimited(_) | SdkError::Connection(_) => true,
            SdkError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider error code, when the provider sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            SdkError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            SdkError::Connection(e.to_string())
        } else if e.is_decode() {
            SdkError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            SdkError::Api {
                status: status.as_u16(),
                code: status.canonical_reason().unwrap_or("unknown").to_string(),
                message: e.to_string(),
            }
        } else {
            SdkError::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Decode(format!("JSON parsing error: {}", e))
    }
}

impl From<toml::de::Error> for SdkError {
    fn from(e: toml::de::Error) -> Self {
        SdkError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for SdkError {
    fn from(e: toml::ser::Error) -> Self {
        SdkError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(SdkError::RateLimited("slow down".into()).is_retryable());
        assert!(SdkError::Connection("reset".into()).is_retryable());
        assert!(SdkError::Api { status: 503, code: "unavailable".into(), message: String::new() }.is_retryable());
        assert!(!SdkError::Api { status: 400, code: "bad_request".into(), message: String::new() }.is_retryable());
        assert!(!SdkError::Conflict("exists".into()).is_retryable());
        assert!(!SdkError::Auth("nope".into()).is_retryable());
    }

    #[test]
    fn test_display_includes_code() {
        let err = SdkError::Api {
            status: 400,
            code: "bad_request".into(),
            message: "invalid value for amount".into(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 400): bad_request: invalid value for amount");
        assert_eq!(err.code(), Some("bad_request"));
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let e = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(SdkError::from(e), SdkError::Decode(_)));
    }
}
