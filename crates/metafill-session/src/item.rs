//! Per-file work items

use crate::error::SessionError;
use metafill_domain::{AppliedMetadata, ExtractionConfig, FileHandle, RawValues};
use serde_json::Value;
use std::fmt;

/// Where a file is in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkState {
    /// Selected, no extraction configuration yet
    Unconfigured,
    /// Has a configuration; may still be changed
    Configured,
    /// Extraction requested; configuration locked
    Extracting,
    /// Raw values available for review
    Extracted,
    /// Extraction failed
    Failed,
    /// Metadata written
    Applied,
    /// Metadata write failed; values kept for another attempt
    ApplyFailed,
}

impl WorkState {
    /// Whether the configuration can no longer change without `reconfigure`
    pub fn is_locked(&self) -> bool {
        !matches!(self, WorkState::Unconfigured | WorkState::Configured)
    }

    /// Whether raw values are held
    pub fn has_values(&self) -> bool {
        matches!(self, WorkState::Extracted | WorkState::Applied | WorkState::ApplyFailed)
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkState::Unconfigured => "unconfigured",
            WorkState::Configured => "configured",
            WorkState::Extracting => "extracting",
            WorkState::Extracted => "extracted",
            WorkState::Failed => "failed",
            WorkState::Applied => "applied",
            WorkState::ApplyFailed => "apply failed",
        };
        f.write_str(name)
    }
}

/// One file of a batch with its configuration, values and state
///
/// The configuration is fixed once extraction is requested so the values
/// always belong to the template they were extracted for.
#[derive(Debug, Clone)]
pub struct FileWorkItem {
    file: FileHandle,
    config: Option<ExtractionConfig>,
    state: WorkState,
    raw: Option<RawValues>,
    failure: Option<String>,
    applied: Option<AppliedMetadata>,
}

impl FileWorkItem {
    /// Create an unconfigured item
    pub fn new(file: FileHandle) -> Self {
        Self {
            file,
            config: None,
            state: WorkState::Unconfigured,
            raw: None,
            failure: None,
            applied: None,
        }
    }

    /// Create an item with a configuration
    pub fn with_config(file: FileHandle, config: ExtractionConfig) -> Self {
        let mut item = Self::new(file);
        item.config = Some(config);
        item.state = WorkState::Configured;
        item
    }

    /// The file
    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    /// Current state
    pub fn state(&self) -> WorkState {
        self.state
    }

    /// Extraction configuration, if set
    pub fn config(&self) -> Option<&ExtractionConfig> {
        self.config.as_ref()
    }

    /// Extracted (and possibly edited) values
    pub fn raw_values(&self) -> Option<&RawValues> {
        self.raw.as_ref()
    }

    /// Last extraction or apply failure
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Result of the last successful apply
    pub fn applied(&self) -> Option<&AppliedMetadata> {
        self.applied.as_ref()
    }

    /// Set the configuration
    ///
    /// # Errors
    ///
    /// [`SessionError::ConfigLocked`] once extraction has been requested
    pub fn configure(&mut self, config: ExtractionConfig) -> Result<(), SessionError> {
        if self.state.is_locked() {
            return Err(SessionError::ConfigLocked(self.file.id.clone()));
        }
        self.config = Some(config);
        self.state = WorkState::Configured;
        Ok(())
    }

    /// Replace the configuration, discarding any extracted values
    pub fn reconfigure(&mut self, config: ExtractionConfig) {
        self.config = Some(config);
        self.raw = None;
        self.failure = None;
        self.applied = None;
        self.state = WorkState::Configured;
    }

    /// Lock the configuration and return it for the extraction call
    pub fn begin_extraction(&mut self) -> Result<ExtractionConfig, SessionError> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| SessionError::NotConfigured(self.file.id.clone()))?;
        self.state = WorkState::Extracting;
        self.raw = None;
        self.failure = None;
        Ok(config)
    }

    /// Record the extraction result
    pub fn finish_extraction(&mut self, result: Result<RawValues, String>) {
        match result {
            Ok(values) => {
                self.raw = Some(values);
                self.state = WorkState::Extracted;
            }
            Err(reason) => {
                self.failure = Some(reason);
                self.state = WorkState::Failed;
            }
        }
    }

    /// Replace the values after review
    pub fn set_raw_values(&mut self, values: RawValues) -> Result<(), SessionError> {
        if !self.state.has_values() {
            return Err(SessionError::NotExtracted(self.file.id.clone()));
        }
        self.raw = Some(values);
        Ok(())
    }

    /// Edit one value after review
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) -> Result<(), SessionError> {
        match (&mut self.raw, self.state.has_values()) {
            (Some(raw), true) => {
                raw.insert(key.into(), value);
                Ok(())
            }
            _ => Err(SessionError::NotExtracted(self.file.id.clone())),
        }
    }

    /// Record a successful apply
    pub fn mark_applied(&mut self, applied: AppliedMetadata) {
        self.applied = Some(applied);
        self.failure = None;
        self.state = WorkState::Applied;
    }

    /// Record a failed apply; values are kept
    pub fn mark_apply_failed(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
        self.state = WorkState::ApplyFailed;
    }
}
