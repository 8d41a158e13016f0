//! Metafill Session
//!
//! Orchestrates one interactive session over a batch of files:
//!
//! 1. Each file is selected and given its own [`ExtractionConfig`]
//!    (structured against a template, or freeform with an optional prompt)
//! 2. Extraction locks the configuration and stores the raw values
//! 3. A [`Reviewer`] may edit the values or skip the file
//! 4. The values are built into a payload (typed for templates, text for
//!    properties) and written
//!
//! Files are processed one at a time. A failure on one file becomes that
//! file's [`FileOutcome`]; the run continues with the next file.
//!
//! [`ExtractionConfig`]: metafill_domain::ExtractionConfig

#![warn(missing_docs)]

mod batch;
mod diagnostics;
mod error;
mod item;
mod review;
mod session;

pub use batch::Batch;
pub use diagnostics::{apply_hints, verify_applied};
pub use error::{FileFailure, SessionError};
pub use item::{FileWorkItem, WorkState};
pub use review::{ApplyPolicy, AutoAccept, ReviewContext, ReviewDecision, Reviewer};
pub use session::{BatchReport, FileOutcome, OutcomeStatus, PreparedPayload, Session};
