//! Configuration for the Extractor

use crate::error::ExtractorError;
use crate::prompt::DEFAULT_FREEFORM_PROMPT;
use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Prompt used for freeform files that have no prompt of their own
    pub default_prompt: String,

    /// Maximum prompt length (characters) accepted by the AI service
    pub max_prompt_length: usize,

    /// Wrapper objects (`answer`, `results`) unwrapped at most this many times
    pub max_unwrap_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            default_prompt: DEFAULT_FREEFORM_PROMPT.to_string(),
            max_prompt_length: 10_000,
            max_unwrap_depth: 4,
        }
    }
}

impl ExtractorConfig {
    /// Use a different default prompt
    pub fn with_default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_prompt = prompt.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.default_prompt.trim().is_empty() {
            return Err(ExtractorError::Config("default_prompt cannot be empty".to_string()));
        }
        if self.max_prompt_length == 0 {
            return Err(ExtractorError::Config("max_prompt_length must be greater than 0".to_string()));
        }
        if self.default_prompt.chars().count() > self.max_prompt_length {
            return Err(ExtractorError::Config("default_prompt exceeds max_prompt_length".to_string()));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str).map_err(|e| ExtractorError::Config(e.to_string()))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self).map_err(|e| ExtractorError::Config(e.to_string()))
    }
}
