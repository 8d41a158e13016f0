//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// SDK error
    #[error("{0}")]
    Sdk(#[from] metafill_sdk::SdkError),

    /// Extraction setup error
    #[error("{0}")]
    Extractor(#[from] metafill_extractor::ExtractorError),

    /// Session error
    #[error("{0}")]
    Session(#[from] metafill_session::SessionError),

    /// Invalid coercion settings
    #[error("{0}")]
    Coercion(#[from] metafill_coerce::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),

    /// Some files of a batch were not written
    #[error("{0}")]
    Incomplete(String),
}
