//! Hints for failed or suspicious metadata writes

use metafill_domain::MetadataPayload;
use serde_json::Value;

/// Suggestions for an apply failure, based on the provider's message
pub fn apply_hints(reason: &str) -> Vec<String> {
    let lowered = reason.to_lowercase();
    let mut hints = Vec::new();

    if lowered.contains("invalid value") || lowered.contains("bad_request") || lowered.contains("schema") {
        hints.push(
            "Check that each value matches its field type: dates as YYYY-MM-DD, numbers without text, options spelled as in the template".to_string(),
        );
    }
    if lowered.contains("already exists") || lowered.contains("tuple_already_exists") || lowered.contains("conflict") {
        hints.push("An instance already exists on the file; the update path should have been used".to_string());
    }
    if lowered.contains("not found") || lowered.contains("not_found") {
        hints.push("Check the template key and scope, and that the template is available to this account".to_string());
    }
    if lowered.contains("authentication") || lowered.contains("unauthorized") || lowered.contains("access denied") {
        hints.push("The token may have expired or lack metadata write access; log in again".to_string());
    }
    if lowered.contains("rate limited") {
        hints.push("The provider is throttling requests; retry the file later".to_string());
    }

    hints
}

/// Fields that were sent but come back different (or not at all)
///
/// Returns one line per mismatching key.
pub fn verify_applied(payload: &MetadataPayload, stored: &Value) -> Vec<String> {
    let Some(stored) = stored.as_object() else {
        return vec!["provider returned no metadata instance to verify".to_string()];
    };

    payload
        .iter()
        .filter_map(|(key, value)| {
            let sent = value.to_json();
            match stored.get(key) {
                None => Some(format!("{}: not present after apply", key)),
                Some(got) if !same_value(&sent, got) => Some(format!("{}: sent {} but stored {}", key, sent, got)),
                Some(_) => None,
            }
        })
        .collect()
}

/// Compare values, treating numbers numerically (`5` == `5.0`)
fn same_value(sent: &Value, stored: &Value) -> bool {
    match (sent, stored) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => sent == stored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metafill_domain::CoercedValue;
    use serde_json::json;

    #[test]
    fn test_type_mismatch_hint() {
        let hints = apply_hints("API error (HTTP 400): bad_request: Invalid value for field amount");
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("field type"));
    }

    #[test]
    fn test_no_hint_for_unknown_failures() {
        assert!(apply_hints("connection reset by peer").is_empty());
    }

    #[test]
    fn test_verify_applied() {
        let mut payload = MetadataPayload::new();
        payload.insert("vendor", CoercedValue::String("Acme".into()));
        payload.insert("amount", CoercedValue::Float(5.0));
        payload.insert("tags", CoercedValue::MultiSelect(vec!["A".into()]));

        let stored = json!({"$parent": "file_1", "vendor": "ACME", "amount": 5});
        let problems = verify_applied(&payload, &stored);

        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("vendor:"));
        assert!(problems[1].starts_with("tags:"));
    }

    #[test]
    fn test_verify_applied_clean() {
        let mut payload = MetadataPayload::new();
        payload.insert("vendor", CoercedValue::String("Acme".into()));
        assert!(verify_applied(&payload, &json!({"vendor": "Acme"})).is_empty());
    }
}
