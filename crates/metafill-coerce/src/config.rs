//! Configuration for the Coercer

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Date pattern token: an RFC 3339 timestamp, date part kept
pub const DATE_PATTERN_RFC3339: &str = "rfc3339";

/// Date pattern token: a naive `YYYY-MM-DDTHH:MM:SS[.f]` timestamp
pub const DATE_PATTERN_ISO_DATETIME: &str = "iso_datetime";

/// Configuration for type coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercerConfig {
    /// Date patterns tried in order; first match wins
    ///
    /// Entries are chrono format strings, or one of the tokens
    /// [`DATE_PATTERN_RFC3339`] / [`DATE_PATTERN_ISO_DATETIME`].
    pub date_patterns: Vec<String>,

    /// ISO currency codes stripped from either end of numeric text
    pub currency_codes: Vec<String>,

    /// Maximum nesting depth for list/dict literals
    pub max_literal_depth: usize,

    /// Maximum length (bytes) of list/dict literal text
    pub max_literal_len: usize,
}

impl Default for CoercerConfig {
    /// Month-first numeric dates are tried before day-first ones, so
    /// `03/04/2024` is March 4th and `13/03/2024` still parses day-first.
    fn default() -> Self {
        Self {
            date_patterns: default_date_patterns(false),
            currency_codes: default_currency_codes(),
            max_literal_depth: 8,
            max_literal_len: 64 * 1024,
        }
    }
}

impl CoercerConfig {
    /// Day-first preset: `03/04/2024` is April 3rd
    pub fn day_first() -> Self {
        Self {
            date_patterns: default_date_patterns(true),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.date_patterns.is_empty() {
            return Err(ConfigError::Invalid("date_patterns cannot be empty".to_string()));
        }
        if self.date_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid("date_patterns cannot contain empty patterns".to_string()));
        }
        if self.max_literal_depth == 0 {
            return Err(ConfigError::Invalid("max_literal_depth must be greater than 0".to_string()));
        }
        if self.max_literal_len == 0 {
            return Err(ConfigError::Invalid("max_literal_len must be greater than 0".to_string()));
        }
        if let Some(code) = self
            .currency_codes
            .iter()
            .find(|c| c.is_empty() || !c.chars().all(|ch| ch.is_ascii_alphabetic()))
        {
            return Err(ConfigError::Invalid(format!("invalid currency code '{}'", code)));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn default_date_patterns(day_first: bool) -> Vec<String> {
    let (first, second) = if day_first {
        ("%d/%m/%Y", "%m/%d/%Y")
    } else {
        ("%m/%d/%Y", "%d/%m/%Y")
    };

    [
        DATE_PATTERN_RFC3339,
        DATE_PATTERN_ISO_DATETIME,
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%B %d, %Y",
        "%B %d %Y",
        "%d %B %Y",
        "%d %B, %Y",
        first,
        second,
        "%d.%m.%Y",
        "%m-%d-%Y",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_currency_codes() -> Vec<String> {
    ["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "CNY", "INR", "NZD", "SEK", "MXN"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CoercerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_day_first_config_is_valid() {
        let config = CoercerConfig::day_first();
        assert!(config.validate().is_ok());

        let dmy = config.date_patterns.iter().position(|p| p == "%d/%m/%Y").unwrap();
        let mdy = config.date_patterns.iter().position(|p| p == "%m/%d/%Y").unwrap();
        assert!(dmy < mdy);
    }

    #[test]
    fn test_empty_patterns_rejected() {
        let mut config = CoercerConfig::default();
        config.date_patterns.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_currency_code_rejected() {
        let mut config = CoercerConfig::default();
        config.currency_codes.push("U$D".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CoercerConfig::day_first();
        let toml_str = config.to_toml().unwrap();
        let parsed = CoercerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
