//! Interactive review of extracted values before they are written.

use crate::error::{CliError, Result};
use crate::output::{display_value, Formatter};
use metafill_coerce::{normalize_key, Coercer, FreeformOptions, FreeformPayloadBuilder};
use metafill_domain::{MetadataTemplate, RawValues};
use metafill_session::{ReviewContext, ReviewDecision, Reviewer};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;

const PROMPT: &str = "[a]ccept  [e]dit <field>  [d]elete <field>  [s]kip  [q]uit > ";

/// One line of the review table
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    /// Field key (or property key)
    pub key: String,
    /// Label shown to the user
    pub label: String,
    /// Field type
    pub kind: String,
    /// Value as extracted (or edited)
    pub raw: String,
    /// What will be written, or why nothing will
    pub outcome: std::result::Result<String, String>,
}

/// What the user typed at the review prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    /// Write the values
    Accept,
    /// Leave the file alone
    Skip,
    /// Stop the batch
    Quit,
    /// Change one value
    Edit(String),
    /// Remove one value
    Delete(String),
    /// Show the commands
    Help,
}

/// Parse a review prompt line; `None` for blank input
pub fn parse_review_command(line: &str) -> std::result::Result<Option<ReviewCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word.to_lowercase().as_str(), rest) {
        ("a" | "accept", "") => ReviewCommand::Accept,
        ("s" | "skip", "") => ReviewCommand::Skip,
        ("q" | "quit" | "exit", "") => ReviewCommand::Quit,
        ("h" | "help" | "?", _) => ReviewCommand::Help,
        ("e" | "edit", key) if !key.is_empty() => ReviewCommand::Edit(key.to_string()),
        ("d" | "delete", key) if !key.is_empty() => ReviewCommand::Delete(key.to_string()),
        ("e" | "edit" | "d" | "delete", _) => return Err(format!("'{}' needs a field name", word)),
        _ => return Err(format!("Unknown command '{}'. Type 'help' for commands.", line)),
    };
    Ok(Some(command))
}

/// Value typed by the user, kept as text exactly as typed
///
/// Blank input or `null` clears the value. Typed fields are converted later by
/// the coercer, so numbers, dates and lists stay text here.
pub fn parse_edited_value(input: &str) -> Value {
    match input.trim() {
        "" | "null" => Value::Null,
        _ => Value::String(input.to_string()),
    }
}

/// Preview of what each value will become
pub fn review_rows(
    coercer: &Coercer,
    freeform: FreeformOptions,
    template: Option<&MetadataTemplate>,
    values: &RawValues,
) -> Vec<ReviewRow> {
    match template {
        Some(template) => structured_rows(coercer, template, values),
        None => freeform_rows(freeform, values),
    }
}

fn structured_rows(coercer: &Coercer, template: &MetadataTemplate, values: &RawValues) -> Vec<ReviewRow> {
    let mut rows: Vec<ReviewRow> = template
        .fields
        .iter()
        .filter(|field| !field.hidden)
        .map(|field| {
            let raw = values.get(&field.key);
            let outcome = match raw {
                None | Some(Value::Null) => Err("no value".to_string()),
                Some(Value::String(s)) if s.trim().is_empty() => Err("no value".to_string()),
                Some(value) => coercer
                    .coerce(field, value)
                    .map(|coerced| coerced.to_string())
                    .map_err(|e| e.kind.to_string()),
            };
            ReviewRow {
                key: field.key.clone(),
                label: field.label().to_string(),
                kind: field.field_type.as_str().to_string(),
                raw: raw.map(display_value).unwrap_or_default(),
                outcome,
            }
        })
        .collect();

    rows.extend(values.iter().filter(|(key, _)| !template.contains(key)).map(|(key, value)| ReviewRow {
        key: key.clone(),
        label: key.clone(),
        kind: "-".to_string(),
        raw: display_value(value),
        outcome: Err("not a template field".to_string()),
    }));
    rows
}

fn freeform_rows(options: FreeformOptions, values: &RawValues) -> Vec<ReviewRow> {
    let payload = FreeformPayloadBuilder::new(options).build(values);

    values
        .iter()
        .map(|(key, value)| {
            let target = if options.normalize_keys {
                normalize_key(key)
            } else {
                key.clone()
            };
            let outcome = match payload.get(&target) {
                Some(written) => Ok(written.to_string()),
                None => Err("dropped".to_string()),
            };
            ReviewRow {
                key: key.clone(),
                label: target,
                kind: "text".to_string(),
                raw: display_value(value),
                outcome,
            }
        })
        .collect()
}

/// Key to edit: a template field or an existing value, matched case-insensitively
///
/// Freeform files may add new keys.
fn resolve_key(template: Option<&MetadataTemplate>, values: &RawValues, input: &str) -> Option<String> {
    let known: Vec<&str> = match template {
        Some(template) => template.fields.iter().map(|f| f.key.as_str()).collect(),
        None => values.keys().map(String::as_str).collect(),
    };

    if let Some(key) = known.iter().find(|k| **k == input) {
        return Some(key.to_string());
    }
    if let Some(key) = known.iter().find(|k| k.eq_ignore_ascii_case(input)) {
        return Some(key.to_string());
    }
    match template {
        Some(_) => None,
        None => Some(input.to_string()),
    }
}

/// Reviews each file at a terminal prompt
pub struct InteractiveReviewer {
    editor: DefaultEditor,
    formatter: Formatter,
    coercer: Coercer,
    freeform: FreeformOptions,
}

impl InteractiveReviewer {
    /// Create a reviewer reading from the terminal
    pub fn new(formatter: Formatter, coercer: Coercer, freeform: FreeformOptions) -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e))))?;
        Ok(Self {
            editor,
            formatter,
            coercer,
            freeform,
        })
    }

    fn show(&self, context: &ReviewContext<'_>, values: &RawValues) {
        let rows = review_rows(&self.coercer, self.freeform, context.template, values);
        println!();
        println!("{}", self.formatter.format_review(context.file, &rows));
    }

    fn edit(&mut self, context: &ReviewContext<'_>, values: &mut RawValues, input: &str) {
        let Some(key) = resolve_key(context.template, values, input) else {
            println!("{}", self.formatter.error(&format!("'{}' is not a field of this template", input)));
            return;
        };

        let current = values.get(&key).map(display_value).unwrap_or_default();
        match self.editor.readline_with_initial(&format!("{} = ", key), (current.as_str(), "")) {
            Ok(line) => {
                values.insert(key, parse_edited_value(&line));
            }
            Err(ReadlineError::Interrupted) => {}
            Err(e) => println!("{}", self.formatter.error(&e.to_string())),
        }
    }
}

impl Reviewer for InteractiveReviewer {
    fn review(&mut self, context: &ReviewContext<'_>, values: &mut RawValues) -> ReviewDecision {
        self.show(context, values);

        loop {
            let line = match self.editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return ReviewDecision::Abort,
                Err(e) => {
                    eprintln!("{}", self.formatter.error(&e.to_string()));
                    return ReviewDecision::Abort;
                }
            };

            match parse_review_command(&line) {
                Ok(None) => {}
                Ok(Some(ReviewCommand::Accept)) => return ReviewDecision::Accept,
                Ok(Some(ReviewCommand::Skip)) => return ReviewDecision::Skip,
                Ok(Some(ReviewCommand::Quit)) => return ReviewDecision::Abort,
                Ok(Some(ReviewCommand::Help)) => println!("{}", self.formatter.info(PROMPT.trim_end_matches(" > "))),
                Ok(Some(ReviewCommand::Edit(input))) => {
                    self.edit(context, values, &input);
                    self.show(context, values);
                }
                Ok(Some(ReviewCommand::Delete(input))) => {
                    let removed = resolve_key(context.template, values, &input)
                        .and_then(|key| values.shift_remove(&key));
                    if removed.is_some() {
                        self.show(context, values);
                    } else {
                        println!("{}", self.formatter.warning(&format!("No value for '{}'", input)));
                    }
                }
                Err(message) => println!("{}", self.formatter.error(&message)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metafill_coerce::CoercerConfig;
    use metafill_domain::{FieldType, TemplateField, TemplateRef};
    use serde_json::json;

    fn template() -> MetadataTemplate {
        MetadataTemplate::new(
            TemplateRef::new("enterprise_12345", "invoice"),
            "Invoice",
            vec![
                TemplateField::new("vendor", FieldType::String).with_display_name("Vendor"),
                TemplateField::new("amount", FieldType::Float),
                TemplateField::new("invoiceDate", FieldType::Date),
                TemplateField::new("documentType", FieldType::Enum).with_options(["Invoice", "Receipt"]),
            ],
        )
        .unwrap()
    }

    fn raw(value: Value) -> RawValues {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_review_commands() {
        assert_eq!(parse_review_command("a"), Ok(Some(ReviewCommand::Accept)));
        assert_eq!(parse_review_command(" Skip "), Ok(Some(ReviewCommand::Skip)));
        assert_eq!(parse_review_command("q"), Ok(Some(ReviewCommand::Quit)));
        assert_eq!(parse_review_command("e invoice Date"), Ok(Some(ReviewCommand::Edit("invoice Date".into()))));
        assert_eq!(parse_review_command("delete vendor"), Ok(Some(ReviewCommand::Delete("vendor".into()))));
        assert_eq!(parse_review_command(""), Ok(None));
        assert!(parse_review_command("edit").is_err());
        assert!(parse_review_command("accept now").is_err());
        assert!(parse_review_command("frobnicate").is_err());
    }

    #[test]
    fn test_parse_edited_value() {
        assert_eq!(parse_edited_value("Acme Corp"), json!("Acme Corp"));
        assert_eq!(parse_edited_value("12.50"), json!("12.50"));
        assert_eq!(parse_edited_value(r#"["A", "B"]"#), json!(r#"["A", "B"]"#));
        assert_eq!(parse_edited_value("2024-03-01"), json!("2024-03-01"));
        assert_eq!(parse_edited_value("   "), Value::Null);
        assert_eq!(parse_edited_value("null"), Value::Null);
    }

    #[test]
    fn test_edited_text_stored_unchanged() {
        let typed = ["12.50", "1e3", "00042", "12345678901234567890123", "true", "{\"a\": 1}"];
        let mut values = RawValues::new();
        for (i, text) in typed.iter().enumerate() {
            values.insert(format!("k{}", i), parse_edited_value(text));
        }

        let payload = FreeformPayloadBuilder::default().build(&values);
        for (i, text) in typed.iter().enumerate() {
            assert_eq!(
                payload.get(&format!("k{}", i)),
                Some(&metafill_domain::CoercedValue::String(text.to_string()))
            );
        }
    }

    #[test]
    fn test_edited_list_text_coerced_for_multi_select() {
        let coercer = Coercer::new(CoercerConfig::default()).unwrap();
        let field = TemplateField::new("tags", FieldType::MultiSelect).with_options(["A", "B", "C"]);

        let edited = parse_edited_value("['a', 'C']");
        assert_eq!(
            coercer.coerce(&field, &edited).unwrap(),
            metafill_domain::CoercedValue::MultiSelect(vec!["A".into(), "C".into()])
        );
    }

    #[test]
    fn test_structured_preview() {
        let coercer = Coercer::new(CoercerConfig::default()).unwrap();
        let values = raw(json!({
            "vendor": "Acme",
            "amount": "abc",
            "documentType": "receipt",
            "notes": "extra"
        }));

        let rows = review_rows(&coercer, FreeformOptions::default(), Some(&template()), &values);
        let by_key = |k: &str| rows.iter().find(|r| r.key == k).unwrap().clone();

        assert_eq!(rows.len(), 5);
        assert_eq!(by_key("vendor").label, "Vendor");
        assert_eq!(by_key("vendor").outcome, Ok("Acme".to_string()));
        assert_eq!(by_key("amount").outcome, Err("invalid numeric format".to_string()));
        assert_eq!(by_key("invoiceDate").outcome, Err("no value".to_string()));
        assert_eq!(by_key("documentType").outcome, Ok("Receipt".to_string()));
        assert_eq!(by_key("notes").outcome, Err("not a template field".to_string()));
    }

    #[test]
    fn test_freeform_preview() {
        let coercer = Coercer::new(CoercerConfig::default()).unwrap();
        let options = FreeformOptions {
            normalize_keys: true,
            filter_placeholders: true,
        };
        let values = raw(json!({"Party Name": "Jane", "Term": 12, "Signed": "<insert date>"}));

        let rows = review_rows(&coercer, options, None, &values);
        assert_eq!(rows[0].label, "party_name");
        assert_eq!(rows[0].outcome, Ok("Jane".to_string()));
        assert_eq!(rows[1].outcome, Ok("12".to_string()));
        assert_eq!(rows[2].outcome, Err("dropped".to_string()));
    }

    #[test]
    fn test_resolve_key() {
        let template = template();
        let values = raw(json!({"vendor": "Acme"}));

        assert_eq!(resolve_key(Some(&template), &values, "AMOUNT"), Some("amount".to_string()));
        assert_eq!(resolve_key(Some(&template), &values, "notes"), None);
        assert_eq!(resolve_key(None, &values, "Vendor"), Some("vendor".to_string()));
        assert_eq!(resolve_key(None, &values, "new_key"), Some("new_key".to_string()));
    }
}
