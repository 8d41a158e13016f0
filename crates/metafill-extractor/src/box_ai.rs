//! Box AI extraction client

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_extraction_response, ResponseKind};
use crate::prompt::PromptBuilder;
use async_trait::async_trait;
use metafill_domain::traits::MetadataExtractor;
use metafill_domain::{ExtractionConfig, ExtractionMode, FileHandle, RawValues};
use metafill_sdk::{BoxClient, SdkError};
use std::sync::Arc;
use tracing::{debug, info};

/// Extracts metadata with Box AI
///
/// The file's [`ExtractionConfig`] picks the call: structured configs send
/// the template reference, freeform configs send a prompt.
pub struct BoxAiExtractor {
    client: Arc<BoxClient>,
    config: ExtractorConfig,
}

impl BoxAiExtractor {
    /// Create an extractor
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(client: Arc<BoxClient>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn prompt_for(&self, custom: Option<&str>) -> Result<String, ExtractorError> {
        let prompt = PromptBuilder::new(&self.config.default_prompt)
            .with_custom(custom)
            .build();
        let length = prompt.chars().count();
        if length > self.config.max_prompt_length {
            return Err(ExtractorError::ExtractionFailed(format!(
                "prompt too long: {} chars (max: {})",
                length, self.config.max_prompt_length
            )));
        }
        Ok(prompt)
    }
}

#[async_trait]
impl MetadataExtractor for BoxAiExtractor {
    type Error = ExtractorError;

    async fn extract(
        &self,
        file: &FileHandle,
        config: &ExtractionConfig,
    ) -> Result<RawValues, Self::Error> {
        if !file.is_file() {
            return Err(ExtractorError::ExtractionFailed(format!("{} is not a file", file)));
        }

        let (response, kind) = match config.mode() {
            ExtractionMode::Structured { template } => {
                info!("Extracting {} with template {}", file, template);
                let response = self.client.ai_extract_structured(&file.id, template).await;
                (response, ResponseKind::Structured)
            }
            ExtractionMode::Freeform { prompt } => {
                info!("Extracting {} with freeform prompt", file);
                let prompt = self.prompt_for(prompt.as_deref())?;
                let response = self.client.ai_extract(&file.id, &prompt).await;
                (response, ResponseKind::Freeform)
            }
        };

        let response = response.map_err(|e| match e {
            SdkError::NotFound(message) => {
                ExtractorError::ExtractionFailed(format!("{} not found: {}", file, message))
            }
            other => ExtractorError::Sdk(other),
        })?;

        let values = parse_extraction_response(&response, kind, self.config.max_unwrap_depth)?;
        debug!("Extracted {} value(s) from {}", values.len(), file);
        Ok(values)
    }
}
