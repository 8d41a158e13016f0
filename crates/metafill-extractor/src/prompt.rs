//! Prompts for freeform extraction

/// Prompt used when neither the file nor the configuration supplies one
pub const DEFAULT_FREEFORM_PROMPT: &str = "Extract the key metadata from this document. \
Respond with a single flat JSON object whose keys are short field names and whose \
values are the extracted text. Omit fields that do not appear in the document.";

/// Builds the prompt sent for a freeform extraction
pub struct PromptBuilder<'a> {
    custom: Option<&'a str>,
    fallback: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder falling back to `fallback`
    pub fn new(fallback: &'a str) -> Self {
        Self { custom: None, fallback }
    }

    /// Use the file's own prompt, if it has a non-blank one
    pub fn with_custom(mut self, custom: Option<&'a str>) -> Self {
        self.custom = custom.filter(|p| !p.trim().is_empty());
        self
    }

    /// Build the prompt
    pub fn build(&self) -> String {
        self.custom.unwrap_or(self.fallback).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_prompt_wins() {
        let prompt = PromptBuilder::new(DEFAULT_FREEFORM_PROMPT)
            .with_custom(Some("  Who signed it? "))
            .build();
        assert_eq!(prompt, "Who signed it?");
    }

    #[test]
    fn test_blank_custom_prompt_ignored() {
        let prompt = PromptBuilder::new(DEFAULT_FREEFORM_PROMPT).with_custom(Some("   ")).build();
        assert_eq!(prompt, DEFAULT_FREEFORM_PROMPT);
    }

    #[test]
    fn test_default_prompt() {
        assert_eq!(PromptBuilder::new("fallback").build(), "fallback");
    }
}
