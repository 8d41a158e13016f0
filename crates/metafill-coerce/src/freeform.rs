//! Freeform (properties) payload assembly

use crate::coercer::text_of;
use metafill_domain::{CoercedValue, MetadataPayload, RawValues, PROVIDER_BOOKKEEPING_KEYS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const PLACEHOLDER_WORDS: &[&str] = &["insert", "placeholder", "enter", "fill in", "your", "example"];
const PLACEHOLDER_BRACKETS: &[char] = &['<', '>', '[', ']'];

/// Options for freeform payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeformOptions {
    /// Rewrite keys to lowercase `snake_case`
    #[serde(default)]
    pub normalize_keys: bool,

    /// Drop values that look like unfilled template placeholders
    #[serde(default)]
    pub filter_placeholders: bool,
}

/// Builds properties payloads: every value stored as text
#[derive(Debug, Clone, Default)]
pub struct FreeformPayloadBuilder {
    options: FreeformOptions,
}

impl FreeformPayloadBuilder {
    /// Create a builder
    pub fn new(options: FreeformOptions) -> Self {
        Self { options }
    }

    /// Active options
    pub fn options(&self) -> FreeformOptions {
        self.options
    }

    /// Build a payload from `raw`, preserving key order
    pub fn build(&self, raw: &RawValues) -> MetadataPayload {
        let mut payload = MetadataPayload::new();

        for (key, value) in raw {
            if PROVIDER_BOOKKEEPING_KEYS.contains(&key.as_str()) {
                continue;
            }

            let text = text_of(value);
            if self.options.filter_placeholders && is_placeholder(value) {
                debug!("Dropping placeholder value for '{}': {}", key, text);
                continue;
            }

            let key = if self.options.normalize_keys {
                normalize_key(key)
            } else {
                key.clone()
            };
            if key.is_empty() {
                debug!("Dropping value with empty key");
                continue;
            }
            if payload.contains_key(&key) {
                debug!("Key '{}' already present, keeping first value", key);
                continue;
            }

            payload.insert(key, CoercedValue::String(text));
        }

        payload
    }
}

/// Lowercase `snake_case` form of a property key
///
/// Runs of whitespace, `-` and `_` become one `_`; other characters that are
/// not ASCII alphanumeric are removed.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut pending_sep = false;

    for c in key.trim().chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = !out.is_empty();
        } else if c.is_ascii_alphanumeric() {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.push(c.to_ascii_lowercase());
        }
    }

    out
}

/// Whether a value looks like an unfilled placeholder (`"<insert date>"`)
///
/// Only text values are considered.
pub fn is_placeholder(value: &Value) -> bool {
    let Value::String(s) = value else {
        return false;
    };
    let lowered = s.to_lowercase();
    lowered.contains(PLACEHOLDER_BRACKETS) || PLACEHOLDER_WORDS.iter().any(|w| lowered.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn raw(value: Value) -> RawValues {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_values_become_text() {
        let builder = FreeformPayloadBuilder::default();
        let payload = builder.build(&raw(json!({
            "Vendor Name": "Acme",
            "Total": 12.5,
            "Paid": true,
            "Lines": ["a", "b"]
        })));

        assert_eq!(payload.get("Vendor Name"), Some(&CoercedValue::String("Acme".into())));
        assert_eq!(payload.get("Total"), Some(&CoercedValue::String("12.5".into())));
        assert_eq!(payload.get("Paid"), Some(&CoercedValue::String("true".into())));
        assert_eq!(payload.get("Lines"), Some(&CoercedValue::String("a, b".into())));
    }

    #[test]
    fn test_bookkeeping_keys_dropped() {
        let builder = FreeformPayloadBuilder::default();
        let payload = builder.build(&raw(json!({
            "title": "Lease",
            "ai_agent_info": {"models": []},
            "created_at": "2024-01-01T00:00:00Z",
            "completion_reason": "done"
        })));

        let keys: Vec<_> = payload.keys().cloned().collect();
        assert_eq!(keys, vec!["title"]);
    }

    #[test]
    fn test_normalize_keys() {
        assert_eq!(normalize_key("Vendor Name"), "vendor_name");
        assert_eq!(normalize_key("  Due-Date  "), "due_date");
        assert_eq!(normalize_key("Total ($)"), "total");
        assert_eq!(normalize_key("already_snake"), "already_snake");
        assert_eq!(normalize_key("a  -  b"), "a_b");
        assert_eq!(normalize_key("???"), "");
    }

    #[test]
    fn test_normalized_collision_keeps_first() {
        let builder = FreeformPayloadBuilder::new(FreeformOptions {
            normalize_keys: true,
            ..Default::default()
        });
        let payload = builder.build(&raw(json!({"Due Date": "first", "due-date": "second", "!!": "x"})));

        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("due_date"), Some(&CoercedValue::String("first".into())));
    }

    #[test]
    fn test_placeholders() {
        assert!(is_placeholder(&json!("<insert date>")));
        assert!(is_placeholder(&json!("Enter the vendor")));
        assert!(is_placeholder(&json!("[Name]")));
        assert!(!is_placeholder(&json!("Acme Corp")));
        assert!(!is_placeholder(&json!(42)));
    }

    #[test]
    fn test_placeholder_filtering_is_opt_in() {
        let values = raw(json!({"vendor": "Acme", "date": "<insert date>"}));

        let kept = FreeformPayloadBuilder::default().build(&values);
        assert_eq!(kept.len(), 2);

        let filtered = FreeformPayloadBuilder::new(FreeformOptions {
            filter_placeholders: true,
            ..Default::default()
        })
        .build(&values);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.contains_key("vendor"));
    }

    proptest! {
        #[test]
        fn prop_default_options_round_trip_strings(
            entries in proptest::collection::vec(("[a-zA-Z][a-zA-Z0-9 ]{0,12}", ".{0,40}"), 0..8)
        ) {
            let mut values = RawValues::new();
            for (k, v) in &entries {
                if !PROVIDER_BOOKKEEPING_KEYS.contains(&k.as_str()) {
                    values.entry(k.clone()).or_insert_with(|| Value::String(v.clone()));
                }
            }

            let payload = FreeformPayloadBuilder::default().build(&values);

            prop_assert_eq!(payload.len(), values.len());
            for (k, v) in &values {
                prop_assert_eq!(payload.get(k), Some(&CoercedValue::String(text_of(v))));
            }
        }
    }
}
