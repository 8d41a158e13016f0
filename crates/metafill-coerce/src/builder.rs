//! Structured payload assembly
//!
//! Maps a file's raw values onto a template's fields. Each field is coerced
//! on its own, so one bad value never hides the rest: the outcome keeps the
//! fields that converted, the errors for those that did not, and the
//! template fields that had no usable value at all.

use crate::coercer::Coercer;
use crate::error::CoercionError;
use metafill_domain::{MetadataPayload, MetadataTemplate, RawValues};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Which template fields a build should consider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelection {
    /// Every field of the template
    #[default]
    All,
    /// Only the named field keys
    Only(HashSet<String>),
}

impl FieldSelection {
    /// Select only `keys`
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSelection::Only(keys.into_iter().map(Into::into).collect())
    }

    /// Whether `key` is selected
    pub fn includes(&self, key: &str) -> bool {
        match self {
            FieldSelection::All => true,
            FieldSelection::Only(keys) => keys.contains(key),
        }
    }
}

/// Result of building one file's structured payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutcome {
    /// Fields that coerced successfully, in template field order
    pub payload: MetadataPayload,
    /// One error per field whose value could not be coerced
    pub errors: Vec<CoercionError>,
    /// Selected template fields with no value, or a null/blank one
    pub missing: Vec<String>,
    /// Raw keys that are not fields of the template
    pub ignored: Vec<String>,
}

impl BuildOutcome {
    /// Whether no selected field failed coercion
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any selected field failed coercion
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Builds template payloads through a [`Coercer`]
pub struct StructuredPayloadBuilder<'a> {
    coercer: &'a Coercer,
}

impl<'a> StructuredPayloadBuilder<'a> {
    /// Create a builder
    pub fn new(coercer: &'a Coercer) -> Self {
        Self { coercer }
    }

    /// Build a payload for `template` from `raw`
    pub fn build(
        &self,
        template: &MetadataTemplate,
        raw: &RawValues,
        selection: &FieldSelection,
    ) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();

        for field in template.fields.iter().filter(|f| selection.includes(&f.key)) {
            let value = match raw.get(&field.key) {
                Some(value) if !is_blank(value) => value,
                _ => {
                    outcome.missing.push(field.key.clone());
                    continue;
                }
            };

            match self.coercer.coerce(field, value) {
                Ok(coerced) => {
                    outcome.payload.insert(field.key.clone(), coerced);
                }
                Err(e) => outcome.errors.push(e),
            }
        }

        outcome.ignored = raw
            .keys()
            .filter(|k| !template.contains(k))
            .cloned()
            .collect();

        debug!(
            "Built payload for {}: {} ok, {} errors, {} missing, {} ignored",
            template.template_ref,
            outcome.payload.len(),
            outcome.errors.len(),
            outcome.missing.len(),
            outcome.ignored.len()
        );

        outcome
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
