//! Metadata templates and their typed fields

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Declared type of a template field
///
/// Names match the provider's schema (`multiSelect` is camel-cased on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Free text
    String,
    /// Base-10 decimal number
    Float,
    /// Calendar date
    Date,
    /// Exactly one of the field's options
    Enum,
    /// Any subset of the field's options
    MultiSelect,
}

impl FieldType {
    /// Get the type name as the provider spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Date => "date",
            FieldType::Enum => "enum",
            FieldType::MultiSelect => "multiSelect",
        }
    }

    /// Whether values of this type are drawn from a fixed option list
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Enum | FieldType::MultiSelect)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a metadata template
///
/// Immutable once fetched from the provider for the duration of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    /// Identifier, unique within the template
    pub key: String,

    /// Human-readable label
    #[serde(default)]
    pub display_name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Allowed values, in order (enum and multiSelect only)
    #[serde(
        default,
        deserialize_with = "deserialize_options",
        serialize_with = "serialize_options",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<String>,

    /// Hidden fields are not shown for review
    #[serde(default)]
    pub hidden: bool,
}

impl TemplateField {
    /// Create a field without options
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        let key = key.into();
        Self {
            display_name: key.clone(),
            key,
            field_type,
            options: Vec::new(),
            hidden: false,
        }
    }

    /// Attach an option list
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Label used in prompts and tables
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.key
        } else {
            &self.display_name
        }
    }
}

/// The provider sends options as `[{"key": "Invoice"}]`; config files may use plain strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionRepr {
    Keyed { key: String },
    Plain(String),
}

fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<OptionRepr>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|o| match o {
            OptionRepr::Keyed { key } => key,
            OptionRepr::Plain(s) => s,
        })
        .collect())
}

fn serialize_options<S>(options: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[derive(Serialize)]
    struct Keyed<'a> {
        key: &'a str,
    }
    serializer.collect_seq(options.iter().map(|key| Keyed { key }))
}

/// Reference to a template in the provider: `scope` + `template_key`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRef {
    /// Provider scope, e.g. `enterprise_12345` or `global`
    pub scope: String,
    /// Template key within the scope
    pub template_key: String,
}

impl TemplateRef {
    /// Create a template reference
    pub fn new(scope: impl Into<String>, template_key: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            template_key: template_key.into(),
        }
    }

    /// Parse a template identifier
    ///
    /// Accepts `scope/templateKey`, `enterprise_<id>_<templateKey>`,
    /// `enterprise_<templateKey>` and `global_<templateKey>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use metafill_domain::TemplateRef;
    ///
    /// let t = TemplateRef::parse("enterprise_12345_invoiceData").unwrap();
    /// assert_eq!(t.scope, "enterprise_12345");
    /// assert_eq!(t.template_key, "invoiceData");
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Template identifier cannot be empty".to_string());
        }

        if let Some((scope, key)) = s.split_once('/') {
            if scope.is_empty() || key.is_empty() {
                return Err(format!("Invalid template identifier: {}", s));
            }
            return Ok(Self::new(scope, key));
        }

        let parts: Vec<&str> = s.split('_').collect();
        match parts.as_slice() {
            ["enterprise", id, rest @ ..]
                if !rest.is_empty() && !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) =>
            {
                Ok(Self::new(format!("enterprise_{}", id), rest.join("_")))
            }
            [scope @ ("enterprise" | "global"), rest @ ..] if !rest.is_empty() => {
                let key = rest.join("_");
                if key.is_empty() {
                    return Err(format!("Invalid template identifier: {}", s));
                }
                Ok(Self::new(*scope, key))
            }
            _ => Err(format!(
                "Invalid template identifier '{}'. Expected 'scope/templateKey' or 'enterprise_<id>_<templateKey>'",
                s
            )),
        }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.template_key)
    }
}

impl std::str::FromStr for TemplateRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A metadata template: a named schema of typed fields
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTemplate {
    /// Where the template lives
    pub template_ref: TemplateRef,
    /// Human-readable name
    pub display_name: String,
    /// Fields in provider order
    pub fields: Vec<TemplateField>,
}

impl MetadataTemplate {
    /// Create a template
    ///
    /// # Errors
    /// Returns error if two fields share a key
    pub fn new(
        template_ref: TemplateRef,
        display_name: impl Into<String>,
        fields: Vec<TemplateField>,
    ) -> Result<Self, String> {
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(format!("Duplicate field key '{}' in template {}", field.key, template_ref));
            }
        }
        Ok(Self {
            template_ref,
            display_name: display_name.into(),
            fields,
        })
    }

    /// Look up a field by key
    pub fn field(&self, key: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Whether the template declares `key`
    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }
}
