//! Applicant consolidation, shortlisting, and decisioning workflows.
//!
//! Child records describing one applicant are merged into a single canonical
//! dossier, scored against deterministic shortlist rules, and optionally sent
//! to a language model for a qualitative assessment. The pipeline module ties
//! those stages together and isolates failures per applicant.

pub mod consolidate;
pub mod domain;
pub mod llm;
pub mod pipeline;
pub mod repository;
pub mod restore;
pub mod router;
pub mod schema;
pub mod shortlist;

#[cfg(test)]
mod tests;

pub use consolidate::{compress, dossier_from_children};
pub use domain::{
    ApplicantId, ApplicationDossier, Currency, LlmAssessment, PersonalDetails, SalaryPreference,
    ShortlistStatus, ShortlistedLead, WorkExperience,
};
pub use llm::{
    AssessmentError, AssessmentOrchestrator, AssessmentReport, CompletionError,
    CompletionGateway, CompletionRequest, GenerationConfig,
};
pub use pipeline::{
    ApplicantPipeline, AssessmentSummary, BatchFailure, BatchReport, CancelFlag, PipelineError,
    PipelineOutcome, PipelineStage, ShortlistSummary,
};
pub use repository::{ApplicantRecord, ApplicantStatusView, ApplicantStore, StoreError};
pub use restore::{children_from_dossier, decompress};
pub use router::applicant_router;
pub use schema::{ChildRecords, RecordFields, ValidationError};
pub use shortlist::{
    CriterionReview, ShortlistConfig, ShortlistCriterion, ShortlistEngine, ShortlistOutcome,
};
