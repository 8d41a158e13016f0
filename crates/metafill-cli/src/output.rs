//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::review::ReviewRow;
use colored::*;
use metafill_domain::{FileHandle, MetadataTemplate, RawValues, UserInfo};
use metafill_session::{BatchReport, FileFailure, FileOutcome, OutcomeStatus};
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

/// Result of extracting one file, as shown by the extract command
pub type ExtractionResult = std::result::Result<RawValues, String>;

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the authenticated account.
    pub fn format_user(&self, user: &UserInfo) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(user)?),
            OutputFormat::Quiet => Ok(user.id.clone()),
            OutputFormat::Table => Ok(format!("{} <{}> (id {})", user.name, user.login, user.id)),
        }
    }

    /// Format a folder listing.
    pub fn format_files(&self, files: &[FileHandle]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(files)?),
            OutputFormat::Quiet => Ok(files.iter().map(|f| f.id.as_str()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if files.is_empty() {
                    return Ok(self.colorize("No items found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Type", "Size"]);
                for file in files {
                    let kind = serde_json::to_value(file.kind)?;
                    builder.push_record([
                        file.id.clone(),
                        file.name.clone(),
                        kind.as_str().unwrap_or_default().to_string(),
                        file.size.map(format_size).unwrap_or_default(),
                    ]);
                }
                Ok(self.finish_table(builder))
            }
        }
    }

    /// Format a template's fields.
    pub fn format_template(&self, template: &MetadataTemplate) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let fields: Vec<Value> = template
                    .fields
                    .iter()
                    .map(|f| {
                        json!({
                            "key": f.key,
                            "displayName": f.display_name,
                            "type": f.field_type.as_str(),
                            "options": f.options,
                            "hidden": f.hidden,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "scope": template.template_ref.scope,
                    "templateKey": template.template_ref.template_key,
                    "displayName": template.display_name,
                    "fields": fields,
                }))?)
            }
            OutputFormat::Quiet => Ok(template.fields.iter().map(|f| f.key.as_str()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Key", "Name", "Type", "Options"]);
                for field in &template.fields {
                    builder.push_record([
                        field.key.clone(),
                        field.label().to_string(),
                        field.field_type.as_str().to_string(),
                        field.options.join(", "),
                    ]);
                }
                Ok(format!(
                    "{} ({})\n{}",
                    template.display_name,
                    template.template_ref,
                    self.finish_table(builder)
                ))
            }
        }
    }

    /// Format extracted values for several files.
    pub fn format_extractions(&self, results: &[(FileHandle, ExtractionResult)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<Value> = results
                    .iter()
                    .map(|(file, result)| match result {
                        Ok(values) => json!({"file_id": file.id, "file_name": file.name, "values": values}),
                        Err(reason) => json!({"file_id": file.id, "file_name": file.name, "error": reason}),
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&entries)?)
            }
            OutputFormat::Quiet => Ok(results
                .iter()
                .filter(|(_, result)| result.is_ok())
                .map(|(file, _)| file.id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut sections = Vec::with_capacity(results.len());
                for (file, result) in results {
                    let heading = self.colorize(&file.to_string(), "cyan");
                    let body = match result {
                        Ok(values) if values.is_empty() => self.warning("No values extracted"),
                        Ok(values) => {
                            let mut builder = Builder::default();
                            builder.push_record(["Key", "Value"]);
                            for (key, value) in values {
                                builder.push_record([key.clone(), display_value(value)]);
                            }
                            self.finish_table(builder)
                        }
                        Err(reason) => self.error(reason),
                    };
                    sections.push(format!("{}\n{}", heading, body));
                }
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format the review table for one file.
    pub fn format_review(&self, file: &FileHandle, rows: &[ReviewRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Type", "Extracted", "Will write"]);
        for row in rows {
            let outcome = match &row.outcome {
                Ok(value) => value.clone(),
                Err(problem) => self.colorize(problem, "red"),
            };
            builder.push_record([row.label.clone(), row.kind.clone(), row.raw.clone(), outcome]);
        }
        format!("{}\n{}", self.colorize(&file.to_string(), "cyan"), self.finish_table(builder))
    }

    /// Format a batch report.
    pub fn format_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let files: Vec<Value> = report.outcomes.iter().map(outcome_json).collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "run_id": report.run_id.to_string(),
                    "aborted": report.aborted,
                    "applied": report.applied(),
                    "failed": report.failed(),
                    "skipped": report.skipped(),
                    "files": files,
                }))?)
            }
            OutputFormat::Quiet => Ok(report
                .outcomes
                .iter()
                .filter(|o| o.is_applied())
                .map(|o| o.file.id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if report.outcomes.is_empty() {
                    return Ok(self.colorize("No files processed.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["File", "Status", "Details"]);
                for outcome in &report.outcomes {
                    let (status, color) = match &outcome.status {
                        OutcomeStatus::Applied { updated: true, .. } => ("updated", "green"),
                        OutcomeStatus::Applied { .. } => ("created", "green"),
                        OutcomeStatus::Skipped => ("skipped", "yellow"),
                        OutcomeStatus::Failed(_) => ("failed", "red"),
                    };
                    builder.push_record([
                        outcome.file.to_string(),
                        self.colorize(status, color),
                        outcome_details(outcome).join("\n"),
                    ]);
                }

                let mut summary = format!(
                    "{} applied, {} failed, {} skipped",
                    report.applied(),
                    report.failed(),
                    report.skipped()
                );
                if report.aborted {
                    summary.push_str(" (stopped early)");
                }
                Ok(format!("{}\n{}", self.finish_table(builder), summary))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn finish_table(&self, builder: Builder) -> String {
        let mut table: Table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Raw value as shown to the user: strings without quotes
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

fn outcome_details(outcome: &FileOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    match &outcome.status {
        OutcomeStatus::Applied { fields, .. } => lines.push(format!("{} field(s) written", fields)),
        OutcomeStatus::Skipped => {}
        OutcomeStatus::Failed(FileFailure::IncompletePayload(_)) => {
            lines.push("not written: fields could not be converted".to_string())
        }
        OutcomeStatus::Failed(failure) => lines.push(failure.to_string()),
    }
    lines.extend(outcome.field_errors.iter().map(|e| e.to_string()));
    if !outcome.missing.is_empty() {
        lines.push(format!("missing: {}", outcome.missing.join(", ")));
    }
    if !outcome.ignored.is_empty() {
        lines.push(format!("ignored: {}", outcome.ignored.join(", ")));
    }
    lines.extend(outcome.hints.iter().map(|h| format!("hint: {}", h)));
    lines
}

fn outcome_json(outcome: &FileOutcome) -> Value {
    let (status, fields, updated, reason) = match &outcome.status {
        OutcomeStatus::Applied { fields, updated } => ("applied", Some(*fields), Some(*updated), None),
        OutcomeStatus::Skipped => ("skipped", None, None, None),
        OutcomeStatus::Failed(failure) => ("failed", None, None, Some(failure.to_string())),
    };
    json!({
        "file_id": outcome.file.id,
        "file_name": outcome.file.name,
        "status": status,
        "fields": fields,
        "updated": updated,
        "reason": reason,
        "field_errors": outcome.field_errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        "missing": outcome.missing,
        "ignored": outcome.ignored,
        "hints": outcome.hints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metafill_domain::{FieldType, TemplateField, TemplateRef};

    fn files() -> Vec<FileHandle> {
        let mut a = FileHandle::file("101", "invoice.pdf");
        a.size = Some(2048);
        vec![a, FileHandle::file("102", "receipt.png")]
    }

    fn template() -> MetadataTemplate {
        MetadataTemplate::new(
            TemplateRef::new("enterprise_12345", "invoice"),
            "Invoice",
            vec![
                TemplateField::new("vendor", FieldType::String),
                TemplateField::new("documentType", FieldType::Enum).with_options(["Invoice", "Receipt"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_files_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_files(&files()).unwrap();
        assert!(output.contains("invoice.pdf"));
        assert!(output.contains("2.0 KB"));
        assert!(output.contains("file"));
    }

    #[test]
    fn test_files_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_files(&files()).unwrap(), "101\n102");
    }

    #[test]
    fn test_files_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_files(&files()).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["id"], "101");
        assert_eq!(parsed[0]["type"], "file");
    }

    #[test]
    fn test_empty_listing() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_files(&[]).unwrap().contains("No items found"));
    }

    #[test]
    fn test_template_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_template(&template()).unwrap();
        assert!(output.starts_with("Invoice (enterprise_12345/invoice)"));
        assert!(output.contains("Invoice, Receipt"));
    }

    #[test]
    fn test_extractions_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let mut values = RawValues::new();
        values.insert("vendor".into(), json!("Acme"));
        let results = vec![
            (FileHandle::file("1", "a.pdf"), Ok(values)),
            (FileHandle::file("2", "b.pdf"), Err("Extraction failed: encrypted".to_string())),
        ];

        let parsed: Value = serde_json::from_str(&formatter.format_extractions(&results).unwrap()).unwrap();
        assert_eq!(parsed[0]["values"]["vendor"], "Acme");
        assert_eq!(parsed[1]["error"], "Extraction failed: encrypted");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Acme")), "Acme");
        assert_eq!(display_value(&json!(12.5)), "12.5");
        assert_eq!(display_value(&json!(["A", "B"])), r#"["A","B"]"#);
        assert_eq!(display_value(&Value::Null), "");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
