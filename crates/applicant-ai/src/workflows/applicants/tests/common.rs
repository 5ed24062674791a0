//! Shared doubles and builders for the applicant workflow tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;

use crate::workflows::applicants::domain::{
    ApplicantId, LlmAssessment, ShortlistStatus, ShortlistedLead,
};
use crate::workflows::applicants::llm::{
    CompletionError, CompletionGateway, CompletionRequest, GenerationConfig,
};
use crate::workflows::applicants::pipeline::ApplicantPipeline;
use crate::workflows::applicants::repository::{ApplicantRecord, ApplicantStore, StoreError};
use crate::workflows::applicants::schema::{ChildRecords, RecordFields};
use crate::workflows::applicants::shortlist::ShortlistConfig;

struct StoredApplicant {
    record: ApplicantRecord,
    children: ChildRecords,
}

/// In-memory store that keeps applicants in insertion order so batch
/// assertions stay deterministic.
#[derive(Default)]
pub struct MemoryStore {
    applicants: Mutex<Vec<StoredApplicant>>,
    leads: Mutex<Vec<ShortlistedLead>>,
    fail_listing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_applicant(&self, applicant_id: &str, children: ChildRecords) {
        let record = ApplicantRecord {
            applicant_id: ApplicantId(applicant_id.to_string()),
            compressed_document: None,
            status: ShortlistStatus::Pending,
            assessment: None,
        };
        self.applicants
            .lock()
            .expect("store lock")
            .push(StoredApplicant { record, children });
    }

    pub fn children(&self, applicant_id: &str) -> ChildRecords {
        let target = ApplicantId(applicant_id.to_string());
        self.applicants
            .lock()
            .expect("store lock")
            .iter()
            .find(|entry| entry.record.applicant_id == target)
            .map(|entry| entry.children.clone())
            .expect("applicant seeded")
    }

    pub fn document(&self, applicant_id: &str) -> Option<String> {
        let target = ApplicantId(applicant_id.to_string());
        self.applicants
            .lock()
            .expect("store lock")
            .iter()
            .find(|entry| entry.record.applicant_id == target)
            .and_then(|entry| entry.record.compressed_document.clone())
    }

    pub fn status(&self, applicant_id: &str) -> ShortlistStatus {
        let target = ApplicantId(applicant_id.to_string());
        self.applicants
            .lock()
            .expect("store lock")
            .iter()
            .find(|entry| entry.record.applicant_id == target)
            .map(|entry| entry.record.status)
            .expect("applicant seeded")
    }

    pub fn assessment(&self, applicant_id: &str) -> Option<LlmAssessment> {
        let target = ApplicantId(applicant_id.to_string());
        self.applicants
            .lock()
            .expect("store lock")
            .iter()
            .find(|entry| entry.record.applicant_id == target)
            .and_then(|entry| entry.record.assessment.clone())
    }

    pub fn lead_count(&self) -> usize {
        self.leads.lock().expect("leads lock").len()
    }

    pub fn disable_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }
}

impl ApplicantStore for MemoryStore {
    fn list_applicants(&self) -> Result<Vec<ApplicantId>, StoreError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("listing disabled".to_string()));
        }
        Ok(self
            .applicants
            .lock()
            .expect("store lock")
            .iter()
            .map(|entry| entry.record.applicant_id.clone())
            .collect())
    }

    fn fetch_applicant(
        &self,
        applicant_id: &ApplicantId,
    ) -> Result<Option<ApplicantRecord>, StoreError> {
        Ok(self
            .applicants
            .lock()
            .expect("store lock")
            .iter()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .map(|entry| entry.record.clone()))
    }

    fn fetch_children(&self, applicant_id: &ApplicantId) -> Result<ChildRecords, StoreError> {
        self.applicants
            .lock()
            .expect("store lock")
            .iter()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .map(|entry| entry.children.clone())
            .ok_or(StoreError::NotFound)
    }

    fn write_document(
        &self,
        applicant_id: &ApplicantId,
        document: &str,
    ) -> Result<(), StoreError> {
        let mut applicants = self.applicants.lock().expect("store lock");
        let entry = applicants
            .iter_mut()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .ok_or(StoreError::NotFound)?;
        entry.record.compressed_document = Some(document.to_string());
        Ok(())
    }

    fn replace_children(
        &self,
        applicant_id: &ApplicantId,
        children: ChildRecords,
    ) -> Result<(), StoreError> {
        let mut applicants = self.applicants.lock().expect("store lock");
        let entry = applicants
            .iter_mut()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .ok_or(StoreError::NotFound)?;
        entry.children = children;
        Ok(())
    }

    fn set_status(
        &self,
        applicant_id: &ApplicantId,
        status: ShortlistStatus,
    ) -> Result<(), StoreError> {
        let mut applicants = self.applicants.lock().expect("store lock");
        let entry = applicants
            .iter_mut()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .ok_or(StoreError::NotFound)?;
        entry.record.status = status;
        Ok(())
    }

    fn write_assessment(
        &self,
        applicant_id: &ApplicantId,
        assessment: &LlmAssessment,
    ) -> Result<(), StoreError> {
        let mut applicants = self.applicants.lock().expect("store lock");
        let entry = applicants
            .iter_mut()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .ok_or(StoreError::NotFound)?;
        entry.record.assessment = Some(assessment.clone());
        Ok(())
    }

    fn append_lead(&self, lead: ShortlistedLead) -> Result<(), StoreError> {
        self.leads.lock().expect("leads lock").push(lead);
        Ok(())
    }

    fn list_leads(&self) -> Result<Vec<ShortlistedLead>, StoreError> {
        Ok(self.leads.lock().expect("leads lock").clone())
    }
}

/// Gateway that replays scripted results in order, then falls back to the
/// canned well-formed response. Records every request it sees.
#[derive(Default)]
pub struct ScriptedGateway {
    responses: Mutex<Vec<Result<String, CompletionError>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn canned() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().expect("request lock").clone()
    }
}

impl CompletionGateway for ScriptedGateway {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("request lock") = Some(request.clone());
        let mut responses = self.responses.lock().expect("responses lock");
        if responses.is_empty() {
            Ok(well_formed_response())
        } else {
            responses.remove(0)
        }
    }
}

/// Gateway that rate limits every call, forever.
#[derive(Default)]
pub struct RateLimitedGateway {
    calls: AtomicUsize,
}

impl RateLimitedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionGateway for RateLimitedGateway {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CompletionError::RateLimited)
    }
}

pub fn well_formed_response() -> String {
    "Summary: Strong senior engineer with recent platform experience.\n\
     Score: 8\n\
     Issues: None\n\
     Follow-Ups:\n\
     - Confirm notice period\n\
     - Verify rate flexibility"
        .to_string()
}

pub fn fields(value: serde_json::Value) -> RecordFields {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Applicant who passes every rule: tier-1 experience, $90/hr at 25
/// hrs/week, located in the US.
pub fn google_children() -> ChildRecords {
    ChildRecords {
        personal: Some(fields(json!({
            "Full Name": "Dana Whitfield",
            "Email": "dana@example.com",
            "Location": "NYC, US",
            "LinkedIn": "https://linkedin.com/in/danawhitfield",
        }))),
        experience: vec![fields(json!({
            "Company": "Google",
            "Title": "Senior Engineer",
            "Start": "2020-01-15",
            "End": "2023-06-30",
            "Technologies": "Rust, Kubernetes",
        }))],
        salary: Some(fields(json!({
            "Preferred Rate": 90,
            "Minimum Rate": 70,
            "Currency": "USD",
            "Availability (hrs/wk)": 25,
        }))),
    }
}

/// Applicant rejected on compensation alone: plenty of experience and an
/// eligible location, but a $150/hr ask.
pub fn expensive_children() -> ChildRecords {
    ChildRecords {
        personal: Some(fields(json!({
            "Full Name": "Priya Nair",
            "Email": "priya@example.com",
            "Location": "Berlin, Germany",
        }))),
        experience: vec![fields(json!({
            "Company": "Midsize Labs",
            "Title": "Staff Engineer",
            "Start": "2016-03-01",
            "End": "2024-01-01",
        }))],
        salary: Some(fields(json!({
            "Preferred Rate": 150,
            "Minimum Rate": 120,
            "Currency": "USD",
            "Availability (hrs/wk)": 30,
        }))),
    }
}

pub fn fast_generation_config() -> GenerationConfig {
    GenerationConfig {
        backoff_base: Duration::ZERO,
        ..GenerationConfig::default()
    }
}

pub fn build_pipeline<G: CompletionGateway>(
    store: Arc<MemoryStore>,
    gateway: Arc<G>,
) -> ApplicantPipeline<MemoryStore, G> {
    ApplicantPipeline::new(
        store,
        gateway,
        ShortlistConfig::default(),
        fast_generation_config(),
    )
}

pub fn frozen_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
}

pub fn id(applicant_id: &str) -> ApplicantId {
    ApplicantId(applicant_id.to_string())
}
