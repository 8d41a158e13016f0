//! Field type coercion

use crate::config::{CoercerConfig, DATE_PATTERN_ISO_DATETIME, DATE_PATTERN_RFC3339};
use crate::error::{CoercionError, CoercionErrorKind, ConfigError};
use crate::literal::{looks_like_literal, LiteralParser};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use metafill_domain::{CoercedValue, FieldType, TemplateField};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₩', '¢', '₽', '₺', '₪', '฿'];

/// Textual form of a raw value
///
/// Strings verbatim, numbers and booleans via display, null as empty text,
/// arrays as their elements' text joined by `", "`, objects as compact JSON.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(text_of).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Converts raw extracted values into the representation a field requires
#[derive(Debug, Clone)]
pub struct Coercer {
    config: CoercerConfig,
    literals: LiteralParser,
    number: Regex,
    ordinal: Regex,
    currency_code: Option<Regex>,
}

impl Coercer {
    /// Create a coercer
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(config: CoercerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let currency_code = if config.currency_codes.is_empty() {
            None
        } else {
            let codes = config
                .currency_codes
                .iter()
                .map(|c| regex::escape(c))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)^(?:{codes})\s*|\s*(?:{codes})$"))?)
        };

        Ok(Self {
            literals: LiteralParser::new(config.max_literal_depth, config.max_literal_len),
            number: Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")?,
            ordinal: Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b")?,
            currency_code,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &CoercerConfig {
        &self.config
    }

    /// Coerce one raw value to `field`'s declared type
    pub fn coerce(&self, field: &TemplateField, raw: &Value) -> Result<CoercedValue, CoercionError> {
        let result = match field.field_type {
            FieldType::String => Ok(CoercedValue::String(text_of(raw))),
            FieldType::Float => self.coerce_float(raw).map(CoercedValue::Float),
            FieldType::Date => self.coerce_date(raw).map(CoercedValue::Date),
            FieldType::Enum => self.coerce_enum(field, raw).map(CoercedValue::Enum),
            FieldType::MultiSelect => self.coerce_multi_select(field, raw).map(CoercedValue::MultiSelect),
        };

        result.map_err(|kind| {
            debug!("Field '{}' ({}) rejected {}: {}", field.key, field.field_type, raw, kind);
            CoercionError::new(&field.key, raw_display(raw), kind)
        })
    }

    fn coerce_float(&self, raw: &Value) -> Result<f64, CoercionErrorKind> {
        match raw {
            Value::Number(n) => n.as_f64().ok_or(CoercionErrorKind::InvalidNumericFormat),
            Value::String(s) => self.parse_number(s).ok_or(CoercionErrorKind::InvalidNumericFormat),
            _ => Err(CoercionErrorKind::InvalidNumericFormat),
        }
    }

    /// Parse decimal text with currency symbols and separators
    fn parse_number(&self, text: &str) -> Option<f64> {
        let mut s = text.trim().to_string();
        if let Some(re) = &self.currency_code {
            s = re.replace_all(&s, "").into_owned();
        }

        let mut s: String = s
            .chars()
            .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace() && *c != '\'' && *c != '_')
            .collect();

        // Accounting negatives: (1,234.50)
        let mut negative = false;
        if s.len() > 2 && s.starts_with('(') && s.ends_with(')') {
            negative = true;
            s = s[1..s.len() - 1].to_string();
        }

        let s = normalize_separators(&s);
        if !self.number.is_match(&s) {
            return None;
        }

        let value: f64 = s.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(if negative { -value } else { value })
    }

    fn coerce_date(&self, raw: &Value) -> Result<NaiveDate, CoercionErrorKind> {
        let text = raw.as_str().ok_or(CoercionErrorKind::InvalidDateFormat)?;
        let cleaned = self.ordinal.replace_all(text.trim(), "$1");
        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

        self.config
            .date_patterns
            .iter()
            .find_map(|pattern| parse_date_with(&cleaned, pattern))
            .ok_or(CoercionErrorKind::InvalidDateFormat)
    }

    fn coerce_enum(&self, field: &TemplateField, raw: &Value) -> Result<String, CoercionErrorKind> {
        let tokens = match raw {
            Value::String(s) if !looks_like_literal(s) => vec![clean_token(s)],
            _ => self.tokens(raw, false)?,
        };

        let not_in_enum = |unmatched: Vec<String>| CoercionErrorKind::ValueNotInEnum {
            unmatched,
            allowed: field.options.clone(),
        };

        match tokens.as_slice() {
            [token] => match_option(&field.options, token)
                .map(str::to_string)
                .ok_or_else(|| not_in_enum(tokens.clone())),
            [] => Err(not_in_enum(vec![text_of(raw)])),
            _ => Err(not_in_enum(tokens.clone())),
        }
    }

    fn coerce_multi_select(
        &self,
        field: &TemplateField,
        raw: &Value,
    ) -> Result<Vec<String>, CoercionErrorKind> {
        // An option may itself contain a separator
        if let Value::String(s) = raw {
            if !looks_like_literal(s) {
                if let Some(option) = match_option(&field.options, &clean_token(s)) {
                    return Ok(vec![option.to_string()]);
                }
            }
        }

        let tokens = self.tokens(raw, true)?;

        let mut selected: Vec<String> = Vec::new();
        let mut unmatched = Vec::new();
        for token in tokens {
            match match_option(&field.options, &token) {
                Some(option) => {
                    if !selected.iter().any(|s| s == option) {
                        selected.push(option.to_string());
                    }
                }
                None => unmatched.push(token),
            }
        }

        if unmatched.is_empty() {
            Ok(selected)
        } else {
            Err(CoercionErrorKind::ValueNotInEnum {
                unmatched,
                allowed: field.options.clone(),
            })
        }
    }

    /// Split a raw value into option candidates
    ///
    /// `split_plain` controls whether plain text is split on `,` / `;`.
    fn tokens(&self, raw: &Value, split_plain: bool) -> Result<Vec<String>, CoercionErrorKind> {
        let texts = match raw {
            Value::Null => Vec::new(),
            Value::String(s) if looks_like_literal(s) => self
                .literals
                .parse(s.trim())
                .map_err(|e| CoercionErrorKind::MalformedLiteral(e.to_string()))?
                .into_texts(),
            Value::String(s) if split_plain => s.split([',', ';']).map(str::to_string).collect(),
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items.iter().flat_map(flatten_json).collect(),
            Value::Object(map) => map.values().flat_map(flatten_json).collect(),
            Value::Bool(_) | Value::Number(_) => vec![text_of(raw)],
        };

        Ok(texts
            .iter()
            .map(|t| clean_token(t))
            .filter(|t| !t.is_empty())
            .collect())
    }
}

/// Text elements of a JSON value, lists and object values flattened
fn flatten_json(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().flat_map(flatten_json).collect(),
        Value::Object(map) => map.values().flat_map(flatten_json).collect(),
        other => vec![text_of(other)],
    }
}

/// Trim and remove one pair of surrounding quotes
fn clean_token(token: &str) -> String {
    let t = token.trim();
    for q in ['\'', '"'] {
        if t.len() >= 2 && t.starts_with(q) && t.ends_with(q) {
            return t[1..t.len() - 1].trim().to_string();
        }
    }
    t.to_string()
}

/// Find the single option matching `token`, case-insensitively
///
/// An exact-case match wins when options differ only by case.
fn match_option<'a>(options: &'a [String], token: &str) -> Option<&'a str> {
    if let Some(exact) = options.iter().find(|o| o.as_str() == token) {
        return Some(exact);
    }

    let lowered = token.to_lowercase();
    let mut matches = options.iter().filter(|o| o.to_lowercase() == lowered);
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Resolve thousands vs decimal separators
///
/// `1,234.50` → `1234.50`, `1.234,50` → `1234.50`, `12,5` → `12.5`,
/// `1,234` → `1234`.
fn normalize_separators(s: &str) -> String {
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');

    match (last_comma, last_dot) {
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(c), None) => {
            let single = s.matches(',').count() == 1;
            let after = s.len() - c - 1;
            if single && after != 3 {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        _ => s.to_string(),
    }
}

fn parse_date_with(text: &str, pattern: &str) -> Option<NaiveDate> {
    match pattern {
        DATE_PATTERN_RFC3339 => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.date_naive()),
        DATE_PATTERN_ISO_DATETIME => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|dt| dt.date()),
        _ => NaiveDate::parse_from_str(text, pattern).ok(),
    }
}

fn raw_display(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
