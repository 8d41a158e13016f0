//! Metafill Extraction Client
//!
//! Asks the provider's AI service for a file's metadata values and turns the
//! answer into [`RawValues`](metafill_domain::RawValues).
//!
//! # Overview
//!
//! The answer format varies between calls and model versions: an object, a
//! JSON string, a JSON string inside a markdown code fence, or any of these
//! under `answer`/`results` wrappers. [`parse_extraction_response`] accepts
//! them all and drops the service's bookkeeping keys. Values are left
//! untyped; coercion happens later, after review.
//!
//! - [`BoxAiExtractor`]: the real client, over [`metafill_sdk::BoxClient`]
//! - [`MockExtractor`]: deterministic responses for tests

#![warn(missing_docs)]

mod box_ai;
mod config;
mod error;
mod mock;
mod parser;
mod prompt;

pub use box_ai::BoxAiExtractor;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use mock::MockExtractor;
pub use parser::{parse_extraction_response, ResponseKind, FREEFORM_ANSWER_KEY};
pub use prompt::{PromptBuilder, DEFAULT_FREEFORM_PROMPT};
