//! Wire types for the provider's REST API

use metafill_domain::{FileHandle, MetadataTemplate, TemplateField, TemplateRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// OAuth token response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// OAuth error body
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OAuthErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

/// Error body returned by the REST API
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// One page of folder items
#[derive(Debug, Deserialize)]
pub(crate) struct ItemsPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub entries: Vec<FileHandle>,
}

/// Template schema response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TemplateSchema {
    pub template_key: String,
    pub scope: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub fields: Vec<Value>,
}

impl TemplateSchema {
    /// Convert to the domain template
    ///
    /// Fields of types this tool does not handle are skipped with a warning
    /// rather than failing the whole template.
    pub fn into_template(self) -> Result<MetadataTemplate, String> {
        let template_ref = TemplateRef::new(self.scope, self.template_key);
        let mut fields = Vec::with_capacity(self.fields.len());

        for raw in self.fields {
            match serde_json::from_value::<TemplateField>(raw.clone()) {
                Ok(field) => fields.push(field),
                Err(e) => {
                    let key = raw.get("key").cloned().unwrap_or_default();
                    warn!("Skipping field {} of {}: {}", key, template_ref, e)
                }
            }
        }

        let display_name = if self.display_name.is_empty() {
            template_ref.template_key.clone()
        } else {
            self.display_name
        };
        MetadataTemplate::new(template_ref, display_name, fields)
    }
}

/// Item reference in AI requests
#[derive(Debug, Serialize)]
pub(crate) struct AiItem<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'a str,
}

impl<'a> AiItem<'a> {
    pub fn file(id: &'a str) -> Self {
        Self { kind: "file", id }
    }
}

/// Body for freeform extraction
#[derive(Debug, Serialize)]
pub(crate) struct AiExtractRequest<'a> {
    pub prompt: &'a str,
    pub items: Vec<AiItem<'a>>,
}

/// Template reference in structured extraction requests
#[derive(Debug, Serialize)]
pub(crate) struct AiTemplateRef<'a> {
    pub template_key: &'a str,
    pub scope: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Body for structured extraction
#[derive(Debug, Serialize)]
pub(crate) struct AiExtractStructuredRequest<'a> {
    pub items: Vec<AiItem<'a>>,
    pub metadata_template: AiTemplateRef<'a>,
}

/// One JSON-patch operation for metadata updates
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct PatchOp {
    pub op: &'static str,
    pub path: String,
    pub value: Value,
}

impl PatchOp {
    /// `add` sets the key whether or not it already exists
    pub fn add(key: &str, value: Value) -> Self {
        Self {
            op: "add",
            path: format!("/{}", escape_pointer(key)),
            value,
        }
    }
}

/// Escape a key for use as a JSON pointer segment
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
