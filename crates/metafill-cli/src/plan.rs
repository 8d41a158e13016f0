//! Per-file extraction plans
//!
//! A plan gives each file its own extraction settings:
//!
//! ```toml
//! [[file]]
//! id = "1234"
//! template = "enterprise_12345/invoice"
//!
//! [[file]]
//! id = "5678"
//! prompt = "List the parties and the lease term"
//!
//! [[file]]
//! id = "9012"
//! freeform = true
//! ```
//!
//! Entries without a template, prompt or `freeform` use the command-line
//! settings.

use crate::error::{CliError, Result};
use metafill_domain::{ExtractionConfig, TemplateRef};
use serde::Deserialize;
use std::path::Path;

/// A list of files with optional per-file settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Plan {
    /// Entries in processing order
    #[serde(default, rename = "file")]
    pub files: Vec<PlanEntry>,
}

/// One file of a plan
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanEntry {
    /// File id
    pub id: String,

    /// Template for structured extraction
    #[serde(default)]
    pub template: Option<String>,

    /// Prompt for freeform extraction
    #[serde(default)]
    pub prompt: Option<String>,

    /// Freeform extraction with the default prompt
    #[serde(default)]
    pub freeform: bool,
}

impl Plan {
    /// Load a plan file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a plan and check every entry
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let plan: Plan = toml::from_str(toml_str)?;
        for entry in &plan.files {
            entry.config()?;
        }
        Ok(plan)
    }
}

impl PlanEntry {
    /// The entry's own configuration, if it has one
    pub fn config(&self) -> Result<Option<ExtractionConfig>> {
        if self.id.trim().is_empty() {
            return Err(CliError::InvalidInput("plan entry with an empty id".to_string()));
        }

        match (&self.template, &self.prompt, self.freeform) {
            (Some(_), Some(_), _) | (Some(_), None, true) => Err(CliError::InvalidInput(format!(
                "file {}: a template cannot be combined with freeform settings",
                self.id
            ))),
            (Some(template), None, false) => {
                let template = TemplateRef::parse(template)
                    .map_err(|e| CliError::InvalidInput(format!("file {}: {}", self.id, e)))?;
                Ok(Some(ExtractionConfig::structured(template)))
            }
            (None, Some(prompt), _) => Ok(Some(ExtractionConfig::freeform(Some(prompt.clone())))),
            (None, None, true) => Ok(Some(ExtractionConfig::freeform(None))),
            (None, None, false) => Ok(None),
        }
    }
}
