//! Session controller: extraction, review, payload building and apply

use crate::batch::Batch;
use crate::diagnostics::{apply_hints, verify_applied};
use crate::error::{FileFailure, SessionError};
use crate::item::WorkState;
use crate::review::{ApplyPolicy, ReviewContext, ReviewDecision, Reviewer};
use metafill_coerce::{
    BuildOutcome, Coercer, CoercionError, FieldSelection, FreeformOptions, FreeformPayloadBuilder,
    StructuredPayloadBuilder,
};
use metafill_domain::traits::{MetadataApplier, MetadataExtractor, TemplateSource};
use metafill_domain::{
    ExtractionConfig, FileHandle, MetadataPayload, MetadataTarget, MetadataTemplate, TemplateRef,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A payload ready to be written, with the build report for structured files
#[derive(Debug, Clone)]
pub struct PreparedPayload {
    /// Where it will be written
    pub target: MetadataTarget,
    /// The values
    pub payload: MetadataPayload,
    /// Field errors, missing and ignored keys (structured only)
    pub report: Option<BuildOutcome>,
}

/// How one file ended
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// Metadata written
    Applied {
        /// Fields written
        fields: usize,
        /// Whether an existing instance was updated
        updated: bool,
    },
    /// Skipped during review
    Skipped,
    /// Nothing written
    Failed(FileFailure),
}

/// Result for one file of a batch run
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// The file
    pub file: FileHandle,
    /// How it ended
    pub status: OutcomeStatus,
    /// Fields that could not be converted
    pub field_errors: Vec<CoercionError>,
    /// Template fields without a value
    pub missing: Vec<String>,
    /// Extracted keys that are not template fields
    pub ignored: Vec<String>,
    /// Suggestions and verification notes
    pub hints: Vec<String>,
}

impl FileOutcome {
    fn new(file: FileHandle, status: OutcomeStatus) -> Self {
        Self {
            file,
            status,
            field_errors: Vec::new(),
            missing: Vec::new(),
            ignored: Vec::new(),
            hints: Vec::new(),
        }
    }

    fn with_report(mut self, report: Option<BuildOutcome>) -> Self {
        if let Some(report) = report {
            self.field_errors = report.errors;
            self.missing = report.missing;
            self.ignored = report.ignored;
        }
        self
    }

    /// Whether metadata was written
    pub fn is_applied(&self) -> bool {
        matches!(self.status, OutcomeStatus::Applied { .. })
    }

    /// Whether the file failed
    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

/// Outcomes of one batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Identifies the run in logs
    pub run_id: Uuid,
    /// One outcome per file processed, in batch order
    pub outcomes: Vec<FileOutcome>,
    /// Whether the reviewer stopped the run early
    pub aborted: bool,
}

impl BatchReport {
    /// Files written
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    /// Files that failed
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Files skipped in review
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Skipped)
            .count()
    }
}

/// Drives a batch of files through extraction, review and apply
///
/// All state lives here and files are processed one at a time. A failure on
/// one file is recorded on its outcome and the run continues.
pub struct Session<X, T, A> {
    extractor: X,
    templates: T,
    applier: A,
    coercer: Coercer,
    freeform: FreeformOptions,
    policy: ApplyPolicy,
    verify: bool,
    template_cache: HashMap<TemplateRef, MetadataTemplate>,
    batch: Batch,
}

impl<X, T, A> Session<X, T, A>
where
    X: MetadataExtractor,
    T: TemplateSource,
    A: MetadataApplier,
{
    /// Create a session with an empty batch
    pub fn new(extractor: X, templates: T, applier: A, coercer: Coercer) -> Self {
        Self {
            extractor,
            templates,
            applier,
            coercer,
            freeform: FreeformOptions::default(),
            policy: ApplyPolicy::default(),
            verify: true,
            template_cache: HashMap::new(),
            batch: Batch::new(),
        }
    }

    /// Set the partial-payload policy
    pub fn with_policy(mut self, policy: ApplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set freeform payload options
    pub fn with_freeform_options(mut self, options: FreeformOptions) -> Self {
        self.freeform = options;
        self
    }

    /// Compare what the provider stored against what was sent
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// The batch
    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    /// The batch, for selection and configuration
    pub fn batch_mut(&mut self) -> &mut Batch {
        &mut self.batch
    }

    /// Active policy
    pub fn policy(&self) -> ApplyPolicy {
        self.policy
    }

    /// Fetch a template, cached for the session
    pub async fn template(&mut self, template_ref: &TemplateRef) -> Result<&MetadataTemplate, SessionError> {
        if !self.template_cache.contains_key(template_ref) {
            let template = self
                .templates
                .get_template(template_ref)
                .await
                .map_err(|e| SessionError::Template(format!("{}: {}", template_ref, e)))?;
            debug!("Loaded template {} with {} fields", template_ref, template.fields.len());
            self.template_cache.insert(template_ref.clone(), template);
        }
        self.template_cache
            .get(template_ref)
            .ok_or_else(|| SessionError::Template(template_ref.to_string()))
    }

    /// Extract one file with its configuration
    ///
    /// The configuration is locked from here on. An extraction failure is
    /// recorded on the item and returned.
    pub async fn extract(&mut self, file_id: &str) -> Result<(), FileFailure> {
        let item = self
            .batch
            .get_mut(file_id)
            .map_err(|e| FileFailure::ExtractionFailed(e.to_string()))?;
        let config = item
            .begin_extraction()
            .map_err(|e| FileFailure::ExtractionFailed(e.to_string()))?;
        let file = item.file().clone();

        let result = self
            .extractor
            .extract(&file, &config)
            .await
            .map_err(|e| e.to_string());

        let item = self
            .batch
            .get_mut(file_id)
            .map_err(|e| FileFailure::ExtractionFailed(e.to_string()))?;
        match result {
            Ok(values) => {
                info!("Extracted {} value(s) from {}", values.len(), file);
                item.finish_extraction(Ok(values));
                Ok(())
            }
            Err(reason) => {
                warn!("Extraction failed for {}: {}", file, reason);
                item.finish_extraction(Err(reason.clone()));
                Err(FileFailure::ExtractionFailed(reason))
            }
        }
    }

    /// Build a file's payload from its current values
    pub async fn prepare(&mut self, file_id: &str, selection: &FieldSelection) -> Result<PreparedPayload, SessionError> {
        let item = self.batch.get(file_id)?;
        if !item.state().has_values() {
            return Err(SessionError::NotExtracted(file_id.to_string()));
        }
        let config = item
            .config()
            .cloned()
            .ok_or_else(|| SessionError::NotConfigured(file_id.to_string()))?;
        let raw = item.raw_values().cloned().unwrap_or_default();

        match config.template() {
            Some(template_ref) => {
                let template = self.template(template_ref).await?.clone();
                let report = StructuredPayloadBuilder::new(&self.coercer).build(&template, &raw, selection);
                Ok(PreparedPayload {
                    target: config.target(),
                    payload: report.payload.clone(),
                    report: Some(report),
                })
            }
            None => Ok(PreparedPayload {
                target: config.target(),
                payload: FreeformPayloadBuilder::new(self.freeform).build(&raw),
                report: None,
            }),
        }
    }

    /// Build and write one file's metadata
    pub async fn apply(&mut self, file_id: &str, selection: &FieldSelection) -> Result<FileOutcome, SessionError> {
        let file = self.batch.get(file_id)?.file().clone();

        let prepared = match self.prepare(file_id, selection).await {
            Ok(prepared) => prepared,
            Err(SessionError::Template(reason)) => {
                let failure = FileFailure::TemplateUnavailable(reason);
                self.batch.get_mut(file_id)?.mark_apply_failed(failure.to_string());
                let mut outcome = FileOutcome::new(file, OutcomeStatus::Failed(failure.clone()));
                outcome.hints = apply_hints(&failure.to_string());
                return Ok(outcome);
            }
            Err(e) => return Err(e),
        };

        let PreparedPayload { target, payload, report } = prepared;
        let has_errors = report.as_ref().map(BuildOutcome::has_errors).unwrap_or(false);

        if has_errors && self.policy == ApplyPolicy::BlockOnErrors {
            let errors = report.as_ref().map(|r| r.errors.clone()).unwrap_or_default();
            let failure = FileFailure::IncompletePayload(errors);
            warn!("Not applying {}: {}", file, failure);
            self.batch.get_mut(file_id)?.mark_apply_failed(failure.to_string());
            return Ok(FileOutcome::new(file, OutcomeStatus::Failed(failure)).with_report(report));
        }

        if payload.is_empty() {
            let failure = FileFailure::ApplyFailed("no values to write".to_string());
            self.batch.get_mut(file_id)?.mark_apply_failed(failure.to_string());
            return Ok(FileOutcome::new(file, OutcomeStatus::Failed(failure)).with_report(report));
        }

        match self.applier.apply(&file, &target, &payload).await {
            Ok(applied) => {
                let mut outcome = FileOutcome::new(
                    file.clone(),
                    OutcomeStatus::Applied {
                        fields: payload.len(),
                        updated: applied.updated,
                    },
                )
                .with_report(report);
                if self.verify {
                    outcome.hints = verify_applied(&payload, &applied.stored);
                    for problem in &outcome.hints {
                        warn!("{}: {}", file, problem);
                    }
                }
                self.batch.get_mut(file_id)?.mark_applied(applied);
                Ok(outcome)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Apply failed for {}: {}", file, reason);
                self.batch.get_mut(file_id)?.mark_apply_failed(reason.clone());
                let mut outcome =
                    FileOutcome::new(file, OutcomeStatus::Failed(FileFailure::ApplyFailed(reason.clone())))
                        .with_report(report);
                outcome.hints = apply_hints(&reason);
                Ok(outcome)
            }
        }
    }

    /// Run every file of the batch: extract, review, build, apply
    ///
    /// Files already extracted are not extracted again. Unconfigured files
    /// get `default_config` when one is given.
    pub async fn run<R: Reviewer>(
        &mut self,
        reviewer: &mut R,
        default_config: Option<&ExtractionConfig>,
    ) -> BatchReport {
        let run_id = Uuid::now_v7();
        let file_ids = self.batch.file_ids();
        info!("Run {}: {} file(s)", run_id, file_ids.len());

        let mut outcomes = Vec::with_capacity(file_ids.len());
        let mut aborted = false;

        for file_id in &file_ids {
            match self.run_file(file_id, reviewer, default_config).await {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => {
                    info!("Run {} aborted during review of file {}", run_id, file_id);
                    aborted = true;
                    break;
                }
                Err(e) => {
                    warn!("Run {}: file {}: {}", run_id, file_id, e);
                    if let Ok(item) = self.batch.get(file_id) {
                        outcomes.push(FileOutcome::new(
                            item.file().clone(),
                            OutcomeStatus::Failed(FileFailure::ExtractionFailed(e.to_string())),
                        ));
                    }
                }
            }
        }

        let report = BatchReport {
            run_id,
            outcomes,
            aborted,
        };
        info!(
            "Run {} complete: {} applied, {} failed, {} skipped",
            run_id,
            report.applied(),
            report.failed(),
            report.skipped()
        );
        report
    }

    /// `Ok(None)` means the reviewer aborted the run
    async fn run_file<R: Reviewer>(
        &mut self,
        file_id: &str,
        reviewer: &mut R,
        default_config: Option<&ExtractionConfig>,
    ) -> Result<Option<FileOutcome>, SessionError> {
        let state = self.batch.get(file_id)?.state();
        if state == WorkState::Unconfigured {
            if let Some(config) = default_config {
                self.batch.configure(file_id, config.clone())?;
            }
        }

        if !self.batch.get(file_id)?.state().has_values() {
            if let Err(failure) = self.extract(file_id).await {
                let file = self.batch.get(file_id)?.file().clone();
                return Ok(Some(FileOutcome::new(file, OutcomeStatus::Failed(failure))));
            }
        }

        let item = self.batch.get(file_id)?;
        let file = item.file().clone();
        let config = item
            .config()
            .cloned()
            .ok_or_else(|| SessionError::NotConfigured(file_id.to_string()))?;
        let mut values = item.raw_values().cloned().unwrap_or_default();

        let template = match config.template() {
            Some(template_ref) => match self.template(template_ref).await {
                Ok(template) => Some(template.clone()),
                Err(e) => {
                    let failure = FileFailure::TemplateUnavailable(e.to_string());
                    let mut outcome = FileOutcome::new(file, OutcomeStatus::Failed(failure));
                    outcome.hints = apply_hints(&e.to_string());
                    return Ok(Some(outcome));
                }
            },
            None => None,
        };

        let context = ReviewContext {
            file: &file,
            config: &config,
            template: template.as_ref(),
        };
        match reviewer.review(&context, &mut values) {
            ReviewDecision::Accept => {}
            ReviewDecision::Skip => {
                info!("Skipped {} in review", file);
                return Ok(Some(FileOutcome::new(file, OutcomeStatus::Skipped)));
            }
            ReviewDecision::Abort => return Ok(None),
        }

        self.batch.get_mut(file_id)?.set_raw_values(values)?;
        self.apply(file_id, &FieldSelection::All).await.map(Some)
    }
}
