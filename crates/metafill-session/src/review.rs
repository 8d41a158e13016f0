//! Review hook between extraction and apply

use metafill_domain::{ExtractionConfig, FileHandle, MetadataTemplate, RawValues};
use serde::{Deserialize, Serialize};

/// What to do with a file after review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Build and apply the (possibly edited) values
    Accept,
    /// Leave this file without writing metadata
    Skip,
    /// Stop the batch; remaining files are not processed
    Abort,
}

/// What a reviewer sees for one file
pub struct ReviewContext<'a> {
    /// The file
    pub file: &'a FileHandle,
    /// Its extraction configuration
    pub config: &'a ExtractionConfig,
    /// Its template, for structured extraction
    pub template: Option<&'a MetadataTemplate>,
}

/// Lets a user inspect and edit extracted values before they are written
pub trait Reviewer {
    /// Review `values` in place
    fn review(&mut self, context: &ReviewContext<'_>, values: &mut RawValues) -> ReviewDecision;
}

/// Accepts every file unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoAccept;

impl Reviewer for AutoAccept {
    fn review(&mut self, _context: &ReviewContext<'_>, _values: &mut RawValues) -> ReviewDecision {
        ReviewDecision::Accept
    }
}

/// What to do when some fields fail coercion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyPolicy {
    /// Write nothing for the file; report the field errors
    #[default]
    BlockOnErrors,
    /// Write the fields that converted; report the rest
    ApplyValidFields,
}
