//! Per-file extraction configuration and metadata targets

use crate::template::TemplateRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope of the provider's freeform properties instance
pub const PROPERTIES_SCOPE: &str = "global";

/// Template key of the provider's freeform properties instance
pub const PROPERTIES_TEMPLATE_KEY: &str = "properties";

/// How metadata is extracted for a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Extract the fields of a template and write typed metadata
    Structured {
        /// Template to extract and apply
        template: TemplateRef,
    },
    /// Extract free key/value pairs and write them as text properties
    Freeform {
        /// Custom prompt, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
}

/// Extraction configuration attached to one file
///
/// Immutable once extraction has been requested for the file; changing it
/// means discarding the extracted values and extracting again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    mode: ExtractionMode,
}

impl ExtractionConfig {
    /// Structured extraction against a template
    pub fn structured(template: TemplateRef) -> Self {
        Self {
            mode: ExtractionMode::Structured { template },
        }
    }

    /// Freeform extraction with an optional prompt
    pub fn freeform(prompt: Option<String>) -> Self {
        Self {
            mode: ExtractionMode::Freeform { prompt },
        }
    }

    /// Extraction mode
    pub fn mode(&self) -> &ExtractionMode {
        &self.mode
    }

    /// Template, when structured
    pub fn template(&self) -> Option<&TemplateRef> {
        match &self.mode {
            ExtractionMode::Structured { template } => Some(template),
            ExtractionMode::Freeform { .. } => None,
        }
    }

    /// Whether this is structured extraction
    pub fn is_structured(&self) -> bool {
        self.template().is_some()
    }

    /// Where extracted metadata is written
    pub fn target(&self) -> MetadataTarget {
        match &self.mode {
            ExtractionMode::Structured { template } => MetadataTarget::Template(template.clone()),
            ExtractionMode::Freeform { .. } => MetadataTarget::Properties,
        }
    }
}

/// Destination metadata instance on a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataTarget {
    /// A template instance
    Template(TemplateRef),
    /// The freeform `global/properties` instance
    Properties,
}

impl MetadataTarget {
    /// Provider scope
    pub fn scope(&self) -> &str {
        match self {
            MetadataTarget::Template(t) => &t.scope,
            MetadataTarget::Properties => PROPERTIES_SCOPE,
        }
    }

    /// Provider template key
    pub fn template_key(&self) -> &str {
        match self {
            MetadataTarget::Template(t) => &t.template_key,
            MetadataTarget::Properties => PROPERTIES_TEMPLATE_KEY,
        }
    }
}

impl fmt::Display for MetadataTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope(), self.template_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_target() {
        let config = ExtractionConfig::structured(TemplateRef::new("enterprise_1", "invoice"));
        assert!(config.is_structured());
        assert_eq!(config.target().to_string(), "enterprise_1/invoice");
    }

    #[test]
    fn test_freeform_target() {
        let config = ExtractionConfig::freeform(None);
        assert!(!config.is_structured());
        assert_eq!(config.target(), MetadataTarget::Properties);
        assert_eq!(config.target().to_string(), "global/properties");
    }

    #[test]
    fn test_config_serde_shape() {
        let config = ExtractionConfig::freeform(Some("Extract the parties".into()));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["mode"]["method"], "freeform");
        let back: ExtractionConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
