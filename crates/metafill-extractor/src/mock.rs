//! Deterministic extractor for tests and offline runs

use crate::error::ExtractorError;
use async_trait::async_trait;
use metafill_domain::traits::MetadataExtractor;
use metafill_domain::{ExtractionConfig, FileHandle, RawValues};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Scripted {
    Values(RawValues),
    Failure(String),
}

/// Mock extractor returning pre-configured values without network calls
///
/// # Examples
///
/// ```
/// use metafill_extractor::MockExtractor;
/// use metafill_domain::RawValues;
/// use serde_json::json;
///
/// let mut values = RawValues::new();
/// values.insert("vendor".into(), json!("Acme"));
///
/// let mut extractor = MockExtractor::default();
/// extractor.add_values("42", values);
/// extractor.add_failure("43", "file is encrypted");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    default: RawValues,
    scripted: HashMap<String, Scripted>,
    calls: Arc<Mutex<Vec<(String, ExtractionConfig)>>>,
}

impl MockExtractor {
    /// Create a mock returning `values` for every file
    pub fn new(values: RawValues) -> Self {
        Self {
            default: values,
            ..Self::default()
        }
    }

    /// Return `values` for the file with `file_id`
    pub fn add_values(&mut self, file_id: impl Into<String>, values: RawValues) {
        self.scripted.insert(file_id.into(), Scripted::Values(values));
    }

    /// Fail extraction for the file with `file_id`
    pub fn add_failure(&mut self, file_id: impl Into<String>, reason: impl Into<String>) {
        self.scripted.insert(file_id.into(), Scripted::Failure(reason.into()));
    }

    /// Number of extract calls made
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// File ids and configs of every call, in order
    pub fn calls(&self) -> Vec<(String, ExtractionConfig)> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<(String, ExtractionConfig)>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MetadataExtractor for MockExtractor {
    type Error = ExtractorError;

    async fn extract(
        &self,
        file: &FileHandle,
        config: &ExtractionConfig,
    ) -> Result<RawValues, Self::Error> {
        self.lock_calls().push((file.id.clone(), config.clone()));

        match self.scripted.get(&file.id) {
            Some(Scripted::Values(values)) => Ok(values.clone()),
            Some(Scripted::Failure(reason)) => Err(ExtractorError::ExtractionFailed(reason.clone())),
            None => Ok(self.default.clone()),
        }
    }
}
