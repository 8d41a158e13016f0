//! Metafill Coercion
//!
//! Converts AI-extracted field values into the representation a metadata
//! template requires before anything is written to the provider.
//!
//! The crate provides:
//! - [`Coercer`]: one raw value + one field type → one coerced value, or a
//!   structured error naming the field, the raw value and the reason
//! - [`LiteralParser`]: a bounded grammar for list/dict literals the AI
//!   service sometimes returns as text (`"['A', 'B']"`); nothing is evaluated
//! - [`StructuredPayloadBuilder`]: a whole template at once, returning the
//!   partial payload alongside per-field errors instead of failing
//! - [`FreeformPayloadBuilder`]: untyped properties, every value stored as text
//!
//! # Examples
//!
//! ```
//! use metafill_coerce::{Coercer, CoercerConfig};
//! use metafill_domain::{CoercedValue, FieldType, TemplateField};
//! use serde_json::json;
//!
//! let coercer = Coercer::new(CoercerConfig::default()).unwrap();
//! let field = TemplateField::new("amount", FieldType::Float);
//!
//! let value = coercer.coerce(&field, &json!("$1,234.50")).unwrap();
//! assert_eq!(value, CoercedValue::Float(1234.5));
//! ```

#![warn(missing_docs)]

mod builder;
mod coercer;
mod config;
mod error;
mod freeform;
mod literal;

pub use builder::{BuildOutcome, FieldSelection, StructuredPayloadBuilder};
pub use coercer::{text_of, Coercer};
pub use config::{CoercerConfig, DATE_PATTERN_ISO_DATETIME, DATE_PATTERN_RFC3339};
pub use error::{CoercionError, CoercionErrorKind, ConfigError, LiteralError};
pub use freeform::{is_placeholder, normalize_key, FreeformOptions, FreeformPayloadBuilder};
pub use literal::{Literal, LiteralParser};
