use serde::Serialize;

use super::domain::{ApplicantId, LlmAssessment, ShortlistStatus, ShortlistedLead};
use super::schema::ChildRecords;

/// Stored state for one applicant, minus the child tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    pub applicant_id: ApplicantId,
    pub compressed_document: Option<String>,
    pub status: ShortlistStatus,
    pub assessment: Option<LlmAssessment>,
}

impl ApplicantRecord {
    pub fn status_view(&self) -> ApplicantStatusView {
        ApplicantStatusView {
            applicant_id: self.applicant_id.clone(),
            status: self.status.label(),
            consolidated: self.compressed_document.is_some(),
            score: self.assessment.as_ref().and_then(|assessment| assessment.score),
            summary: self
                .assessment
                .as_ref()
                .map(|assessment| assessment.summary.clone()),
        }
    }
}

/// Read model served by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantStatusView {
    pub applicant_id: ApplicantId,
    pub status: &'static str,
    pub consolidated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("applicant not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for applicant records, child tables, and the
/// shortlist ledger. Implementations must be shareable across threads.
pub trait ApplicantStore: Send + Sync {
    fn list_applicants(&self) -> Result<Vec<ApplicantId>, StoreError>;

    fn fetch_applicant(
        &self,
        applicant_id: &ApplicantId,
    ) -> Result<Option<ApplicantRecord>, StoreError>;

    /// Raw child records for a known applicant. Absent tables come back as
    /// the empty default, not an error.
    fn fetch_children(&self, applicant_id: &ApplicantId) -> Result<ChildRecords, StoreError>;

    fn write_document(&self, applicant_id: &ApplicantId, document: &str)
        -> Result<(), StoreError>;

    /// Wholesale replacement of the applicant's child tables.
    fn replace_children(
        &self,
        applicant_id: &ApplicantId,
        children: ChildRecords,
    ) -> Result<(), StoreError>;

    fn set_status(
        &self,
        applicant_id: &ApplicantId,
        status: ShortlistStatus,
    ) -> Result<(), StoreError>;

    fn write_assessment(
        &self,
        applicant_id: &ApplicantId,
        assessment: &LlmAssessment,
    ) -> Result<(), StoreError>;

    fn append_lead(&self, lead: ShortlistedLead) -> Result<(), StoreError>;

    fn list_leads(&self) -> Result<Vec<ShortlistedLead>, StoreError>;
}
