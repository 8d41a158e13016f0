//! Parse AI extraction responses into raw field values

use crate::error::ExtractorError;
use metafill_domain::{RawValues, PROVIDER_BOOKKEEPING_KEYS};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Key used for a freeform answer that is not an object
pub const FREEFORM_ANSWER_KEY: &str = "answer";

const WRAPPER_KEYS: &[&str] = &["answer", "results"];

/// Which call produced the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Template-driven extraction; the answer must be an object
    Structured,
    /// Prompt-driven extraction; anything is accepted
    Freeform,
}

/// Parse an extraction response body into raw values
///
/// The answer may be an object, a JSON string, or a JSON string wrapped in a
/// markdown code fence. `answer`/`results` wrappers are unwrapped up to
/// `max_unwrap_depth` times and bookkeeping keys are dropped.
pub fn parse_extraction_response(
    response: &Value,
    kind: ResponseKind,
    max_unwrap_depth: usize,
) -> Result<RawValues, ExtractorError> {
    let mut current = decode_strings(response.clone());

    for _ in 0..max_unwrap_depth {
        match unwrap_once(&current) {
            Some(inner) => current = decode_strings(inner),
            None => break,
        }
    }

    match current {
        Value::Object(map) => Ok(strip_bookkeeping(map)),
        Value::Null => Err(ExtractorError::InvalidResponse("empty answer".to_string())),
        other => match kind {
            ResponseKind::Freeform => {
                debug!("Freeform answer is not an object; storing under '{}'", FREEFORM_ANSWER_KEY);
                let mut values = RawValues::new();
                values.insert(FREEFORM_ANSWER_KEY.to_string(), other);
                Ok(values)
            }
            ResponseKind::Structured => Err(ExtractorError::InvalidResponse(format!(
                "expected an object of field values, got {}",
                type_name(&other)
            ))),
        },
    }
}

/// Decode a JSON string value (possibly fenced) into its JSON content
///
/// Strings that are not JSON are returned unchanged.
fn decode_strings(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };

    let inner = strip_code_fence(text);
    match serde_json::from_str::<Value>(inner) {
        Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
        Ok(_) => value,
        Err(_) => {
            if inner.trim_start().starts_with('{') {
                warn!("Answer looks like JSON but does not parse; keeping it as text");
            }
            value
        }
    }
}

/// The wrapped value, if `value` is a wrapper object
///
/// A wrapper holds an `answer` or `results` key and otherwise only
/// bookkeeping keys.
fn unwrap_once(value: &Value) -> Option<Value> {
    let map = value.as_object()?;
    let wrapper = WRAPPER_KEYS.iter().find(|k| map.contains_key(**k))?;
    let only_bookkeeping = map
        .keys()
        .all(|k| k == wrapper || PROVIDER_BOOKKEEPING_KEYS.contains(&k.as_str()));
    if !only_bookkeeping {
        return None;
    }
    map.get(*wrapper).cloned()
}

/// Remove markdown code fences around JSON text
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => return trimmed.trim_matches('`'),
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn strip_bookkeeping(map: Map<String, Value>) -> RawValues {
    map.into_iter()
        .filter(|(k, _)| !PROVIDER_BOOKKEEPING_KEYS.contains(&k.as_str()))
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(response: Value, kind: ResponseKind) -> Result<RawValues, ExtractorError> {
        parse_extraction_response(&response, kind, 4)
    }

    #[test]
    fn test_object_answer() {
        let values = parse(
            json!({
                "answer": {"vendor": "Acme", "amount": "$1,234.50"},
                "created_at": "2024-03-03T10:00:00Z",
                "completion_reason": "done",
                "ai_agent_info": {"models": [{"name": "x"}]}
            }),
            ResponseKind::Structured,
        )
        .unwrap();

        let keys: Vec<_> = values.keys().cloned().collect();
        assert_eq!(keys, vec!["vendor", "amount"]);
        assert_eq!(values["amount"], "$1,234.50");
    }

    #[test]
    fn test_string_answer() {
        let values = parse(
            json!({"answer": "{\"vendor\": \"Acme\", \"tags\": [\"A\"]}", "completion_reason": "done"}),
            ResponseKind::Freeform,
        )
        .unwrap();
        assert_eq!(values["vendor"], "Acme");
        assert_eq!(values["tags"], json!(["A"]));
    }

    #[test]
    fn test_fenced_answer() {
        let values = parse(
            json!({"answer": "```json\n{\"vendor\": \"Acme\"}\n```"}),
            ResponseKind::Structured,
        )
        .unwrap();
        assert_eq!(values["vendor"], "Acme");
    }

    #[test]
    fn test_nested_wrappers_flattened() {
        let values = parse(
            json!({"answer": {"results": {"answer": {"vendor": "Acme"}}}}),
            ResponseKind::Structured,
        )
        .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["vendor"], "Acme");
    }

    #[test]
    fn test_field_named_answer_is_kept() {
        let values = parse(
            json!({"answer": {"answer": "42", "question": "meaning"}}),
            ResponseKind::Freeform,
        )
        .unwrap();
        assert_eq!(values["answer"], "42");
        assert_eq!(values["question"], "meaning");
    }

    #[test]
    fn test_bookkeeping_removed_from_unwrapped_object() {
        let values = parse(
            json!({"vendor": "Acme", "ai_agent_info": {}, "created_at": "x"}),
            ResponseKind::Structured,
        )
        .unwrap();
        let keys: Vec<_> = values.keys().cloned().collect();
        assert_eq!(keys, vec!["vendor"]);
    }

    #[test]
    fn test_plain_text_freeform_answer() {
        let values = parse(json!({"answer": "The vendor is Acme."}), ResponseKind::Freeform).unwrap();
        assert_eq!(values[FREEFORM_ANSWER_KEY], "The vendor is Acme.");
    }

    #[test]
    fn test_plain_text_structured_answer_rejected() {
        let result = parse(json!({"answer": "The vendor is Acme."}), ResponseKind::Structured);
        assert!(matches!(result, Err(ExtractorError::InvalidResponse(_))));
    }

    #[test]
    fn test_null_answer_rejected() {
        let result = parse(json!({"answer": null}), ResponseKind::Freeform);
        assert!(matches!(result, Err(ExtractorError::InvalidResponse(_))));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
