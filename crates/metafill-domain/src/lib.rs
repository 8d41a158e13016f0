//! Metafill Domain Layer
//!
//! Core data model shared by every other crate: metadata templates and their
//! typed fields, raw values produced by the AI service, coerced values that
//! are safe to write back to the storage provider, and the trait boundaries
//! for the external collaborators (auth, file listing, extraction, apply).
//!
//! ## Key Concepts
//!
//! - **Template**: a provider-stored schema of typed fields
//! - **Raw value**: untrusted JSON produced by the AI service for one field
//! - **Coerced value**: a value whose representation matches its field type
//! - **Payload**: the key → coerced value mapping sent for one file
//! - **Extraction config**: the immutable per-file choice of structured or
//!   freeform extraction
//!
//! This crate holds no I/O. Implementations of the traits live in
//! `metafill-sdk` and `metafill-extractor`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extraction;
pub mod file;
pub mod template;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use extraction::{ExtractionConfig, ExtractionMode, MetadataTarget};
pub use file::{AppliedMetadata, Credentials, FileHandle, ItemKind, UserInfo};
pub use template::{FieldType, MetadataTemplate, TemplateField, TemplateRef};
pub use value::{
    CoercedValue, MetadataPayload, RawValues, DATE_WIRE_FORMAT, PROVIDER_BOOKKEEPING_KEYS,
};
