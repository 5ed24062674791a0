//! Per-applicant processing stages and the batch runner that isolates
//! failures between applicants.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::consolidate;
use super::domain::{ApplicantId, ApplicationDossier, ShortlistStatus, ShortlistedLead};
use super::llm::{
    AssessmentError, AssessmentOrchestrator, AssessmentReport, CompletionGateway,
    GenerationConfig,
};
use super::repository::{ApplicantRecord, ApplicantStore, StoreError};
use super::restore;
use super::schema::{self, ValidationError};
use super::shortlist::{ShortlistConfig, ShortlistEngine, ShortlistOutcome};

/// Cooperative stop signal for batch runs. Cancelling never interrupts the
/// applicant currently in flight; the batch stops before the next one.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Consolidation,
    Restoration,
    Shortlist,
    Assessment,
    Full,
}

impl PipelineStage {
    pub const fn label(self) -> &'static str {
        match self {
            PipelineStage::Consolidation => "consolidation",
            PipelineStage::Restoration => "restoration",
            PipelineStage::Shortlist => "shortlist",
            PipelineStage::Assessment => "assessment",
            PipelineStage::Full => "full-pipeline",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generation(#[from] AssessmentError),
    #[error("applicant '{}' has no compressed document", .applicant_id.0)]
    DocumentMissing { applicant_id: ApplicantId },
}

/// Everything produced by a full single-applicant run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub applicant_id: ApplicantId,
    pub document: String,
    pub shortlist: ShortlistOutcome,
    pub assessment: AssessmentReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub applicant_id: ApplicantId,
    pub stage: PipelineStage,
    pub reason: String,
}

/// What happened to each applicant in a batch. `skipped` counts applicants
/// never started because the batch was cancelled.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub stage: PipelineStage,
    pub succeeded: Vec<ApplicantId>,
    pub failed: Vec<BatchFailure>,
    pub skipped: usize,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortlistSummary {
    pub total: usize,
    pub leads: Vec<ShortlistedLead>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    pub total_applicants: usize,
    pub evaluated: usize,
    pub scored: usize,
    pub unscored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    pub distribution: BTreeMap<u8, usize>,
}

/// Facade over the store, the shortlist rules, and the assessment
/// orchestrator. All handlers and CLI commands go through here.
pub struct ApplicantPipeline<S, G> {
    store: Arc<S>,
    engine: Arc<ShortlistEngine>,
    orchestrator: Arc<AssessmentOrchestrator<G>>,
}

impl<S, G> ApplicantPipeline<S, G>
where
    S: ApplicantStore,
    G: CompletionGateway,
{
    pub fn new(
        store: Arc<S>,
        gateway: Arc<G>,
        shortlist: ShortlistConfig,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            store,
            engine: Arc::new(ShortlistEngine::new(shortlist)),
            orchestrator: Arc::new(AssessmentOrchestrator::new(gateway, generation)),
        }
    }

    pub fn status(&self, applicant_id: &ApplicantId) -> Result<ApplicantRecord, PipelineError> {
        let record = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    /// Merge the applicant's child records and persist the canonical
    /// document.
    pub fn consolidate(&self, applicant_id: &ApplicantId) -> Result<String, PipelineError> {
        self.store
            .fetch_applicant(applicant_id)?
            .ok_or(StoreError::NotFound)?;
        let children = self.store.fetch_children(applicant_id)?;
        let document = consolidate::compress(&children)?;
        self.store.write_document(applicant_id, &document)?;
        info!(applicant = %applicant_id.0, "consolidated applicant dossier");
        Ok(document)
    }

    /// Expand the stored document back into child records, replacing
    /// whatever the child tables held.
    pub fn restore(&self, applicant_id: &ApplicantId) -> Result<ApplicationDossier, PipelineError> {
        let record = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(StoreError::NotFound)?;
        let document = record
            .compressed_document
            .ok_or_else(|| PipelineError::DocumentMissing {
                applicant_id: applicant_id.clone(),
            })?;
        let (dossier, children) = restore::decompress(&document)?;
        self.store.replace_children(applicant_id, children)?;
        info!(applicant = %applicant_id.0, "restored child records from stored dossier");
        Ok(dossier)
    }

    /// Restore from caller-supplied dossier JSON, persisting the child
    /// records and the canonicalized document.
    pub fn restore_from_text(
        &self,
        applicant_id: &ApplicantId,
        text: &str,
    ) -> Result<ApplicationDossier, PipelineError> {
        self.store
            .fetch_applicant(applicant_id)?
            .ok_or(StoreError::NotFound)?;
        let (dossier, children) = restore::decompress(text)?;
        let document = schema::render_dossier(&dossier)?;
        self.store.replace_children(applicant_id, children)?;
        self.store.write_document(applicant_id, &document)?;
        info!(applicant = %applicant_id.0, "restored child records from supplied dossier");
        Ok(dossier)
    }

    /// Review the stored document against the shortlist rules, update the
    /// status, and append a ledger row on the first transition into the
    /// shortlist. Re-reviews of an already shortlisted applicant never
    /// produce a duplicate lead.
    pub fn shortlist(
        &self,
        applicant_id: &ApplicantId,
        today: Option<NaiveDate>,
    ) -> Result<ShortlistOutcome, PipelineError> {
        let record = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(StoreError::NotFound)?;
        let document = record
            .compressed_document
            .as_deref()
            .ok_or_else(|| PipelineError::DocumentMissing {
                applicant_id: applicant_id.clone(),
            })?;
        let dossier = schema::parse_dossier(document)?;

        let today = today.unwrap_or_else(|| Local::now().date_naive());
        let outcome = self.engine.evaluate(&dossier, today);

        let status = if outcome.eligible {
            ShortlistStatus::Shortlisted
        } else {
            ShortlistStatus::Rejected
        };
        self.store.set_status(applicant_id, status)?;

        if outcome.eligible && record.status != ShortlistStatus::Shortlisted {
            self.store.append_lead(ShortlistedLead {
                applicant_id: applicant_id.clone(),
                compressed_document: document.to_string(),
                score_reason: outcome.reason.clone(),
                created_at: Utc::now(),
            })?;
        }

        info!(
            applicant = %applicant_id.0,
            eligible = outcome.eligible,
            "shortlist review recorded"
        );
        Ok(outcome)
    }

    /// Send the stored document for model review. The assessment is only
    /// persisted when the call succeeds.
    pub fn assess(&self, applicant_id: &ApplicantId) -> Result<AssessmentReport, PipelineError> {
        let record = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(StoreError::NotFound)?;
        let document = record
            .compressed_document
            .ok_or_else(|| PipelineError::DocumentMissing {
                applicant_id: applicant_id.clone(),
            })?;
        let report = self.orchestrator.assess(applicant_id, &document)?;
        self.store.write_assessment(applicant_id, &report.assessment)?;
        Ok(report)
    }

    /// Consolidation, shortlist review, and assessment for one applicant.
    pub fn run(
        &self,
        applicant_id: &ApplicantId,
        today: Option<NaiveDate>,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.run_stages(applicant_id, today).map_err(|(_, error)| error)
    }

    fn run_stages(
        &self,
        applicant_id: &ApplicantId,
        today: Option<NaiveDate>,
    ) -> Result<PipelineOutcome, (PipelineStage, PipelineError)> {
        let document = self
            .consolidate(applicant_id)
            .map_err(|error| (PipelineStage::Consolidation, error))?;
        let shortlist = self
            .shortlist(applicant_id, today)
            .map_err(|error| (PipelineStage::Shortlist, error))?;
        let assessment = self
            .assess(applicant_id)
            .map_err(|error| (PipelineStage::Assessment, error))?;
        Ok(PipelineOutcome {
            applicant_id: applicant_id.clone(),
            document,
            shortlist,
            assessment,
        })
    }

    pub fn consolidate_all(&self, cancel: &CancelFlag) -> Result<BatchReport, PipelineError> {
        self.run_batch(PipelineStage::Consolidation, cancel, |id| {
            self.consolidate(id)
                .map(|_| ())
                .map_err(|error| (PipelineStage::Consolidation, error))
        })
    }

    pub fn restore_all(&self, cancel: &CancelFlag) -> Result<BatchReport, PipelineError> {
        self.run_batch(PipelineStage::Restoration, cancel, |id| {
            self.restore(id)
                .map(|_| ())
                .map_err(|error| (PipelineStage::Restoration, error))
        })
    }

    pub fn shortlist_all(
        &self,
        cancel: &CancelFlag,
        today: Option<NaiveDate>,
    ) -> Result<BatchReport, PipelineError> {
        self.run_batch(PipelineStage::Shortlist, cancel, |id| {
            self.shortlist(id, today)
                .map(|_| ())
                .map_err(|error| (PipelineStage::Shortlist, error))
        })
    }

    pub fn assess_all(&self, cancel: &CancelFlag) -> Result<BatchReport, PipelineError> {
        self.run_batch(PipelineStage::Assessment, cancel, |id| {
            self.assess(id)
                .map(|_| ())
                .map_err(|error| (PipelineStage::Assessment, error))
        })
    }

    pub fn run_all(
        &self,
        cancel: &CancelFlag,
        today: Option<NaiveDate>,
    ) -> Result<BatchReport, PipelineError> {
        self.run_batch(PipelineStage::Full, cancel, |id| {
            self.run_stages(id, today).map(|_| ())
        })
    }

    pub fn shortlist_summary(&self) -> Result<ShortlistSummary, PipelineError> {
        let leads = self.store.list_leads()?;
        Ok(ShortlistSummary {
            total: leads.len(),
            leads,
        })
    }

    pub fn assessment_summary(&self) -> Result<AssessmentSummary, PipelineError> {
        let applicants = self.store.list_applicants()?;
        let mut evaluated = 0usize;
        let mut scores: Vec<u8> = Vec::new();
        let mut distribution: BTreeMap<u8, usize> = BTreeMap::new();

        for applicant_id in &applicants {
            let record = match self.store.fetch_applicant(applicant_id)? {
                Some(record) => record,
                None => continue,
            };
            let assessment = match record.assessment {
                Some(assessment) => assessment,
                None => continue,
            };
            evaluated += 1;
            if let Some(score) = assessment.score {
                scores.push(score);
                *distribution.entry(score).or_insert(0) += 1;
            }
        }

        let average_score = (!scores.is_empty()).then(|| {
            scores.iter().map(|score| f64::from(*score)).sum::<f64>() / scores.len() as f64
        });

        Ok(AssessmentSummary {
            total_applicants: applicants.len(),
            evaluated,
            scored: scores.len(),
            unscored: evaluated - scores.len(),
            average_score,
            distribution,
        })
    }

    /// Applicants are processed one at a time. A failure is recorded and
    /// the batch moves on; state written before the failure stays written.
    fn run_batch(
        &self,
        stage: PipelineStage,
        cancel: &CancelFlag,
        mut step: impl FnMut(&ApplicantId) -> Result<(), (PipelineStage, PipelineError)>,
    ) -> Result<BatchReport, PipelineError> {
        let applicants = self.store.list_applicants()?;
        let mut report = BatchReport {
            stage,
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: 0,
        };

        for (index, applicant_id) in applicants.iter().enumerate() {
            if cancel.is_cancelled() {
                report.skipped = applicants.len() - index;
                info!(stage = stage.label(), skipped = report.skipped, "batch cancelled");
                break;
            }
            match step(applicant_id) {
                Ok(()) => report.succeeded.push(applicant_id.clone()),
                Err((failed_stage, error)) => {
                    error!(
                        applicant = %applicant_id.0,
                        stage = failed_stage.label(),
                        error = %error,
                        "applicant failed, continuing batch"
                    );
                    report.failed.push(BatchFailure {
                        applicant_id: applicant_id.clone(),
                        stage: failed_stage,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            stage = stage.label(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped,
            "batch finished"
        );
        Ok(report)
    }
}
