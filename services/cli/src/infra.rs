//! In-memory backing services for the CLI and the HTTP server: a seeded
//! applicant store and the completion client selection.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use applicant_ai::config::AppConfig;
use applicant_ai::error::AppError;
use applicant_ai::workflows::applicants::llm::openai::OpenAiChatClient;
use applicant_ai::workflows::applicants::{
    ApplicantId, ApplicantRecord, ApplicantStore, ChildRecords, CompletionError,
    CompletionGateway, CompletionRequest, LlmAssessment, RecordFields, ShortlistStatus,
    ShortlistedLead, StoreError,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use tracing::warn;

/// Shared handles the operational routes need.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

struct StoredApplicant {
    record: ApplicantRecord,
    children: ChildRecords,
}

/// Applicant store kept entirely in memory, in insertion order.
#[derive(Default)]
pub(crate) struct InMemoryApplicantStore {
    entries: Mutex<Vec<StoredApplicant>>,
    leads: Mutex<Vec<ShortlistedLead>>,
}

impl InMemoryApplicantStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &self,
        applicant_id: &str,
        children: ChildRecords,
    ) -> Result<(), StoreError> {
        let mut entries = self.lock_entries()?;
        entries.push(StoredApplicant {
            record: ApplicantRecord {
                applicant_id: ApplicantId(applicant_id.to_string()),
                compressed_document: None,
                status: ShortlistStatus::Pending,
                assessment: None,
            },
            children,
        });
        Ok(())
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, Vec<StoredApplicant>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("applicant store lock poisoned".to_string()))
    }

    fn lock_leads(&self) -> Result<MutexGuard<'_, Vec<ShortlistedLead>>, StoreError> {
        self.leads
            .lock()
            .map_err(|_| StoreError::Unavailable("lead ledger lock poisoned".to_string()))
    }
}

impl ApplicantStore for InMemoryApplicantStore {
    fn list_applicants(&self) -> Result<Vec<ApplicantId>, StoreError> {
        Ok(self
            .lock_entries()?
            .iter()
            .map(|entry| entry.record.applicant_id.clone())
            .collect())
    }

    fn fetch_applicant(
        &self,
        applicant_id: &ApplicantId,
    ) -> Result<Option<ApplicantRecord>, StoreError> {
        Ok(self
            .lock_entries()?
            .iter()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .map(|entry| entry.record.clone()))
    }

    fn fetch_children(&self, applicant_id: &ApplicantId) -> Result<ChildRecords, StoreError> {
        self.lock_entries()?
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
        let mut entries = self.lock_entries()?;
        let entry = entries
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
        let mut entries = self.lock_entries()?;
        let entry = entries
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
        let mut entries = self.lock_entries()?;
        let entry = entries
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
        let mut entries = self.lock_entries()?;
        let entry = entries
            .iter_mut()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .ok_or(StoreError::NotFound)?;
        entry.record.assessment = Some(assessment.clone());
        Ok(())
    }

    fn append_lead(&self, lead: ShortlistedLead) -> Result<(), StoreError> {
        self.lock_leads()?.push(lead);
        Ok(())
    }

    fn list_leads(&self) -> Result<Vec<ShortlistedLead>, StoreError> {
        Ok(self.lock_leads()?.clone())
    }
}

/// Completion source for this process: the hosted endpoint when an API key
/// is configured, otherwise the scripted stand-in.
pub(crate) enum CompletionClient {
    OpenAi(OpenAiChatClient),
    Scripted(ScriptedCompletionClient),
}

impl CompletionGateway for CompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        match self {
            CompletionClient::OpenAi(client) => client.complete(request),
            CompletionClient::Scripted(client) => client.complete(request),
        }
    }
}

pub(crate) fn build_completion_client(config: &AppConfig) -> Result<CompletionClient, AppError> {
    match &config.openai.api_key {
        Some(api_key) => {
            let client =
                OpenAiChatClient::with_runtime(config.openai.base_url.clone(), api_key.clone())?;
            Ok(CompletionClient::OpenAi(client))
        }
        None => {
            warn!("OPENAI_API_KEY not set, assessments use the built-in scripted client");
            Ok(CompletionClient::Scripted(ScriptedCompletionClient::default()))
        }
    }
}

/// Offline completion client returning a fixed, well-formed assessment.
/// Repeat assessments of the same applicant stay stable.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScriptedCompletionClient;

impl CompletionGateway for ScriptedCompletionClient {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        Ok("Summary: Contractor profile reads as dependable and current.\n\
            Score: 7\n\
            Issues: None\n\
            Follow-Ups:\n\
            - Confirm earliest start date"
            .to_string())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) const SAMPLE_APPLICANT_IDS: [&str; 3] =
    ["sample-dana", "sample-priya", "sample-arjun"];

/// Three sample applicants: one clean pass, one priced out, and one paid
/// in a different currency than the ceiling.
pub(crate) fn seed_sample_applicants(store: &InMemoryApplicantStore) -> Result<(), StoreError> {
    store.insert(SAMPLE_APPLICANT_IDS[0], dana_children())?;
    store.insert(SAMPLE_APPLICANT_IDS[1], priya_children())?;
    store.insert(SAMPLE_APPLICANT_IDS[2], arjun_children())?;
    Ok(())
}

fn record(pairs: Vec<(&str, Value)>) -> RecordFields {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn dana_children() -> ChildRecords {
    ChildRecords {
        personal: Some(record(vec![
            ("Full Name", Value::from("Dana Whitfield")),
            ("Email", Value::from("dana@example.com")),
            ("Location", Value::from("NYC, US")),
            ("LinkedIn", Value::from("https://linkedin.com/in/danawhitfield")),
        ])),
        experience: vec![record(vec![
            ("Company", Value::from("Google")),
            ("Title", Value::from("Senior Engineer")),
            ("Start", Value::from("2020-01-15")),
            ("End", Value::from("2023-06-30")),
            ("Technologies", Value::from("Rust, Kubernetes, gRPC")),
        ])],
        salary: Some(record(vec![
            ("Preferred Rate", Value::from(90)),
            ("Minimum Rate", Value::from(70)),
            ("Currency", Value::from("USD")),
            ("Availability (hrs/wk)", Value::from(25)),
        ])),
    }
}

fn priya_children() -> ChildRecords {
    ChildRecords {
        personal: Some(record(vec![
            ("Full Name", Value::from("Priya Nair")),
            ("Email", Value::from("priya@example.com")),
            ("Location", Value::from("Berlin, Germany")),
        ])),
        experience: vec![record(vec![
            ("Company", Value::from("Midsize Labs")),
            ("Title", Value::from("Staff Engineer")),
            ("Start", Value::from("2016-03-01")),
            ("End", Value::from("2024-01-01")),
        ])],
        salary: Some(record(vec![
            ("Preferred Rate", Value::from(150)),
            ("Minimum Rate", Value::from(120)),
            ("Currency", Value::from("USD")),
            ("Availability (hrs/wk)", Value::from(30)),
        ])),
    }
}

fn arjun_children() -> ChildRecords {
    ChildRecords {
        personal: Some(record(vec![
            ("Full Name", Value::from("Arjun Mehta")),
            ("Email", Value::from("arjun@example.com")),
            ("Location", Value::from("Bangalore, India")),
        ])),
        experience: vec![record(vec![
            ("Company", Value::from("Fintech Collective")),
            ("Title", Value::from("Backend Engineer")),
            ("Start", Value::from("2019-02-01")),
        ])],
        salary: Some(record(vec![
            ("Preferred Rate", Value::from(45)),
            ("Minimum Rate", Value::from(35)),
            ("Currency", Value::from("INR")),
            ("Availability (hrs/wk)", Value::from(40)),
        ])),
    }
}
