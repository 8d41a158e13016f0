//! Error types for the Extractor

use metafill_sdk::SdkError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The AI service could not produce values for the file
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The AI service answered, but not with usable field values
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transport or API error from the SDK
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::InvalidResponse(format!("JSON parse error: {}", e))
    }
}
