//! Coercion error types

use thiserror::Error;

/// Why a raw value could not be coerced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionErrorKind {
    /// No base-10 number could be extracted
    #[error("invalid numeric format")]
    InvalidNumericFormat,

    /// No known date pattern matched
    #[error("invalid date format")]
    InvalidDateFormat,

    /// One or more values match none of the field's options
    #[error("value(s) not in allowed options: {}", .unmatched.join(", "))]
    ValueNotInEnum {
        /// Every element that matched nothing
        unmatched: Vec<String>,
        /// The field's options
        allowed: Vec<String>,
    },

    /// Text looked like a list/dict literal but could not be parsed
    #[error("malformed list literal: {0}")]
    MalformedLiteral(String),
}

/// A field-level coercion failure
///
/// Carries the field key and the offending raw value so the caller can show a
/// precise message per field.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("field '{field_key}': {kind} (got {raw})")]
pub struct CoercionError {
    /// Key of the field being coerced
    pub field_key: String,
    /// Raw value as text
    pub raw: String,
    /// Reason
    pub kind: CoercionErrorKind,
}

impl CoercionError {
    /// Create a coercion error
    pub fn new(field_key: impl Into<String>, raw: impl Into<String>, kind: CoercionErrorKind) -> Self {
        Self {
            field_key: field_key.into(),
            raw: raw.into(),
            kind,
        }
    }
}

/// Errors from the literal grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// Input longer than the configured limit
    #[error("input too long: {0} bytes (max: {1})")]
    TooLong(usize, usize),

    /// Nesting deeper than the configured limit
    #[error("nesting too deep (max: {0})")]
    TooDeep(usize),

    /// Input ended inside a list, map or string
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A character that the grammar does not allow here
    #[error("unexpected '{0}' at position {1}")]
    Unexpected(char, usize),

    /// Characters left over after a complete literal
    #[error("trailing input at position {0}")]
    TrailingInput(usize),
}

/// Invalid coercer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configured value is out of range or empty
    #[error("Configuration error: {0}")]
    Invalid(String),

    /// A pattern built from configuration failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// TOML parse failure
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failure
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_field_and_value() {
        let err = CoercionError::new("amount", "abc", CoercionErrorKind::InvalidNumericFormat);
        assert_eq!(err.to_string(), "field 'amount': invalid numeric format (got abc)");
    }

    #[test]
    fn test_not_in_enum_lists_unmatched() {
        let kind = CoercionErrorKind::ValueNotInEnum {
            unmatched: vec!["X".into(), "Y".into()],
            allowed: vec!["A".into()],
        };
        assert_eq!(kind.to_string(), "value(s) not in allowed options: X, Y");
    }
}
