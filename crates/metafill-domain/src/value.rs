//! Raw and coerced field values, and the payload written for one file

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Field key → untrusted value, as returned by the AI service (possibly edited)
pub type RawValues = IndexMap<String, Value>;

/// Wire format the provider uses for date fields
pub const DATE_WIRE_FORMAT: &str = "%Y-%m-%dT00:00:00.000Z";

/// Keys the AI service adds to its answers that are never user metadata
pub const PROVIDER_BOOKKEEPING_KEYS: &[&str] = &["ai_agent_info", "created_at", "completion_reason"];

/// A value whose representation matches its field's declared type
///
/// Only the coercer constructs these from raw input, so anything held in a
/// [`MetadataPayload`] has already passed type-specific validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    /// Text
    String(String),
    /// Decimal number
    Float(f64),
    /// Calendar date
    Date(NaiveDate),
    /// One option, in the option's canonical casing
    Enum(String),
    /// Options in first-seen order, without duplicates
    MultiSelect(Vec<String>),
}

impl CoercedValue {
    /// JSON representation expected by the provider
    pub fn to_json(&self) -> Value {
        match self {
            CoercedValue::String(s) | CoercedValue::Enum(s) => Value::String(s.clone()),
            CoercedValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CoercedValue::Date(d) => Value::String(d.format(DATE_WIRE_FORMAT).to_string()),
            CoercedValue::MultiSelect(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// Short type name for display
    pub fn kind(&self) -> &'static str {
        match self {
            CoercedValue::String(_) => "string",
            CoercedValue::Float(_) => "float",
            CoercedValue::Date(_) => "date",
            CoercedValue::Enum(_) => "enum",
            CoercedValue::MultiSelect(_) => "multiSelect",
        }
    }
}

impl fmt::Display for CoercedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercedValue::String(s) | CoercedValue::Enum(s) => f.write_str(s),
            CoercedValue::Float(n) => write!(f, "{}", n),
            CoercedValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CoercedValue::MultiSelect(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl Serialize for CoercedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Field key → coerced value for one file, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataPayload {
    entries: IndexMap<String, CoercedValue>,
}

impl MetadataPayload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: CoercedValue) -> Option<CoercedValue> {
        self.entries.insert(key.into(), value)
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&CoercedValue> {
        self.entries.get(key)
    }

    /// Remove a value, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<CoercedValue> {
        self.entries.shift_remove(key)
    }

    /// Whether the payload holds `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CoercedValue)> {
        self.entries.iter()
    }

    /// Field keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// JSON object body for the provider's metadata endpoints
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for MetadataPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter())
    }
}

impl FromIterator<(String, CoercedValue)> for MetadataPayload {
    fn from_iter<T: IntoIterator<Item = (String, CoercedValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MetadataPayload {
    type Item = (&'a String, &'a CoercedValue);
    type IntoIter = indexmap::map::Iter<'a, String, CoercedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
