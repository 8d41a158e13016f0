//! Error types for the Session

use metafill_coerce::CoercionError;
use thiserror::Error;

/// Errors from driving the session itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Extraction was already requested for the file
    #[error("Configuration of file {0} is locked; reconfigure to discard extracted values")]
    ConfigLocked(String),

    /// The file has no extraction configuration
    #[error("File {0} has no extraction configuration")]
    NotConfigured(String),

    /// The file has no extracted values yet
    #[error("File {0} has not been extracted")]
    NotExtracted(String),

    /// The file is not part of the batch
    #[error("Unknown file: {0}")]
    UnknownFile(String),

    /// The file's template could not be loaded
    #[error("Template error: {0}")]
    Template(String),
}

/// Why one file of a batch did not get its metadata
///
/// Recorded on the file's outcome; the batch moves on to the next file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileFailure {
    /// The AI service call failed
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The template needed to build the payload could not be loaded
    #[error("Template unavailable: {0}")]
    TemplateUnavailable(String),

    /// Some fields could not be coerced and the policy blocks partial payloads
    #[error("{} field(s) could not be converted", .0.len())]
    IncompletePayload(Vec<CoercionError>),

    /// The metadata write failed
    #[error("Apply failed: {0}")]
    ApplyFailed(String),
}
