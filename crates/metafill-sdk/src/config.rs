//! Client configuration

use crate::error::SdkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default REST API base
pub const DEFAULT_API_BASE_URL: &str = "https://api.box.com/2.0";

/// Default OAuth token endpoint
pub const DEFAULT_AUTH_URL: &str = "https://api.box.com/oauth2/token";

/// Default timeout for requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts for retryable requests
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound on attempts per request
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Largest page the folder listing endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Who a client-credentials token acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    /// The enterprise's service account
    Enterprise,
    /// A managed user
    User,
}

impl SubjectType {
    /// Wire name for `box_subject_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Enterprise => "enterprise",
            SubjectType::User => "user",
        }
    }
}

/// How to obtain an access token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthMethod {
    /// A short-lived token pasted from the developer console
    DeveloperToken {
        /// The token
        token: String,
    },
    /// Server-to-server client-credentials grant
    ClientCredentials {
        /// App client id
        client_id: String,
        /// App client secret
        client_secret: String,
        /// Subject kind
        subject_type: SubjectType,
        /// Enterprise id or user id
        subject_id: String,
    },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::DeveloperToken { .. } => f
                .debug_struct("DeveloperToken")
                .field("token", &"<redacted>")
                .finish(),
            AuthMethod::ClientCredentials {
                client_id,
                subject_type,
                subject_id,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("subject_type", subject_type)
                .field("subject_id", subject_id)
                .finish(),
        }
    }
}

/// Configuration for [`crate::BoxClient`] and [`crate::BoxAuthenticator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// REST API base, without trailing slash
    pub api_base_url: String,

    /// OAuth token endpoint
    pub auth_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Attempts for requests failing with 429/5xx or a connection error
    pub max_retries: u32,

    /// First backoff delay; doubles on each retry
    pub retry_base_delay_ms: u64,

    /// Items requested per folder listing page
    pub page_size: u32,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: 1000,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl SdkConfig {
    /// Configuration pointing at a different host (tests, proxies)
    ///
    /// `base` is the host root; `/2.0` and `/oauth2/token` are appended.
    pub fn for_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base_url: format!("{}/2.0", base),
            auth_url: format!("{}/oauth2/token", base),
            ..Self::default()
        }
    }

    /// Set the number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first backoff delay
    pub fn with_retry_base_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_base_delay_ms = delay_ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SdkError> {
        for (name, url) in [("api_base_url", &self.api_base_url), ("auth_url", &self.auth_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SdkError::Config(format!("{} must be an http(s) URL, got '{}'", name, url)));
            }
        }
        if self.timeout_secs == 0 {
            return Err(SdkError::Config("timeout_secs must be greater than 0".to_string()));
        }
        if self.max_retries == 0 || self.max_retries > MAX_RETRIES_LIMIT {
            return Err(SdkError::Config(format!(
                "max_retries must be between 1 and {}",
                MAX_RETRIES_LIMIT
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(SdkError::Config(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, SdkError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, SdkError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
