//! End-to-end checks through the public crate surface: seed a store, run
//! the pipeline, and drive the HTTP router with real requests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::ServiceExt;

use applicant_ai::workflows::applicants::{
    ApplicantId, ApplicantPipeline, ApplicantRecord, ApplicantStore, CancelFlag, ChildRecords,
    CompletionError, CompletionGateway, CompletionRequest, GenerationConfig, LlmAssessment,
    RecordFields, ShortlistConfig, ShortlistStatus, ShortlistedLead, StoreError,
    applicant_router,
};

struct Entry {
    record: ApplicantRecord,
    children: ChildRecords,
}

#[derive(Default)]
struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
    leads: Mutex<Vec<ShortlistedLead>>,
}

impl MemoryStore {
    fn seed(&self, applicant_id: &str, children: ChildRecords) {
        self.entries.lock().expect("store lock").push(Entry {
            record: ApplicantRecord {
                applicant_id: ApplicantId(applicant_id.to_string()),
                compressed_document: None,
                status: ShortlistStatus::Pending,
                assessment: None,
            },
            children,
        });
    }

    fn with_entry<T>(&self, applicant_id: &ApplicantId, f: impl FnOnce(&Entry) -> T) -> Option<T> {
        self.entries
            .lock()
            .expect("store lock")
            .iter()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .map(f)
    }

    fn with_entry_mut(
        &self,
        applicant_id: &ApplicantId,
        f: impl FnOnce(&mut Entry),
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store lock");
        let entry = entries
            .iter_mut()
            .find(|entry| &entry.record.applicant_id == applicant_id)
            .ok_or(StoreError::NotFound)?;
        f(entry);
        Ok(())
    }
}

impl ApplicantStore for MemoryStore {
    fn list_applicants(&self) -> Result<Vec<ApplicantId>, StoreError> {
        Ok(self
            .entries
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
        Ok(self.with_entry(applicant_id, |entry| entry.record.clone()))
    }

    fn fetch_children(&self, applicant_id: &ApplicantId) -> Result<ChildRecords, StoreError> {
        self.with_entry(applicant_id, |entry| entry.children.clone())
            .ok_or(StoreError::NotFound)
    }

    fn write_document(
        &self,
        applicant_id: &ApplicantId,
        document: &str,
    ) -> Result<(), StoreError> {
        self.with_entry_mut(applicant_id, |entry| {
            entry.record.compressed_document = Some(document.to_string());
        })
    }

    fn replace_children(
        &self,
        applicant_id: &ApplicantId,
        children: ChildRecords,
    ) -> Result<(), StoreError> {
        self.with_entry_mut(applicant_id, |entry| entry.children = children)
    }

    fn set_status(
        &self,
        applicant_id: &ApplicantId,
        status: ShortlistStatus,
    ) -> Result<(), StoreError> {
        self.with_entry_mut(applicant_id, |entry| entry.record.status = status)
    }

    fn write_assessment(
        &self,
        applicant_id: &ApplicantId,
        assessment: &LlmAssessment,
    ) -> Result<(), StoreError> {
        self.with_entry_mut(applicant_id, |entry| {
            entry.record.assessment = Some(assessment.clone());
        })
    }

    fn append_lead(&self, lead: ShortlistedLead) -> Result<(), StoreError> {
        self.leads.lock().expect("leads lock").push(lead);
        Ok(())
    }

    fn list_leads(&self) -> Result<Vec<ShortlistedLead>, StoreError> {
        Ok(self.leads.lock().expect("leads lock").clone())
    }
}

struct CannedGateway {
    calls: AtomicUsize,
}

impl CannedGateway {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl CompletionGateway for CannedGateway {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Summary: Experienced contractor, ready to start.\n\
            Score: 7\n\
            Issues: None\n\
            Follow-Ups:\n\
            - Confirm start date"
            .to_string())
    }
}

fn record_fields(value: Value) -> RecordFields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn strong_applicant() -> ChildRecords {
    ChildRecords {
        personal: Some(record_fields(json!({
            "Full Name": "Dana Whitfield",
            "Email": "dana@example.com",
            "Location": "NYC, US",
        }))),
        experience: vec![record_fields(json!({
            "Company": "Google",
            "Title": "Senior Engineer",
            "Start": "2020-01-15",
            "End": "2023-06-30",
            "Technologies": "Rust, Kubernetes",
        }))],
        salary: Some(record_fields(json!({
            "Preferred Rate": 90,
            "Minimum Rate": 70,
            "Currency": "USD",
            "Availability (hrs/wk)": 25,
        }))),
    }
}

fn expensive_applicant() -> ChildRecords {
    ChildRecords {
        personal: Some(record_fields(json!({
            "Full Name": "Priya Nair",
            "Email": "priya@example.com",
            "Location": "Berlin, Germany",
        }))),
        experience: vec![record_fields(json!({
            "Company": "Midsize Labs",
            "Title": "Staff Engineer",
            "Start": "2016-03-01",
            "End": "2024-01-01",
        }))],
        salary: Some(record_fields(json!({
            "Preferred Rate": 150,
            "Minimum Rate": 120,
            "Currency": "USD",
            "Availability (hrs/wk)": 30,
        }))),
    }
}

fn build_pipeline(
    store: Arc<MemoryStore>,
) -> Arc<ApplicantPipeline<MemoryStore, CannedGateway>> {
    let generation = GenerationConfig {
        backoff_base: Duration::ZERO,
        ..GenerationConfig::default()
    };
    Arc::new(ApplicantPipeline::new(
        store,
        Arc::new(CannedGateway::new()),
        ShortlistConfig::default(),
        generation,
    ))
}

fn review_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn batch_run_processes_every_applicant() {
    let store = Arc::new(MemoryStore::default());
    store.seed("app-1", strong_applicant());
    store.seed("app-2", expensive_applicant());
    let pipeline = build_pipeline(Arc::clone(&store));

    let report = pipeline
        .run_all(&CancelFlag::new(), Some(review_date()))
        .expect("batch runs");

    assert!(report.is_clean());
    assert_eq!(report.succeeded.len(), 2);

    let strong = ApplicantId("app-1".to_string());
    let record = store
        .fetch_applicant(&strong)
        .expect("store reads")
        .expect("applicant exists");
    assert_eq!(record.status, ShortlistStatus::Shortlisted);
    assert!(record.compressed_document.is_some());
    assert_eq!(
        record.assessment.as_ref().and_then(|a| a.score),
        Some(7)
    );

    let expensive = ApplicantId("app-2".to_string());
    let record = store
        .fetch_applicant(&expensive)
        .expect("store reads")
        .expect("applicant exists");
    assert_eq!(record.status, ShortlistStatus::Rejected);

    let leads = store.list_leads().expect("leads read");
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].applicant_id, strong);
}

#[tokio::test]
async fn http_surface_runs_the_full_workflow() {
    let store = Arc::new(MemoryStore::default());
    store.seed("app-1", strong_applicant());
    let router = applicant_router(build_pipeline(Arc::clone(&store)));

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/applicants/app-1/consolidate")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(
        body["document"]
            .as_str()
            .expect("document present")
            .contains("Dana Whitfield")
    );

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/applicants/app-1/shortlist")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"today\":\"2024-05-01\"}"))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["eligible"], true);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/applicants/app-1/assess")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/applicants/app-1")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let body = read_json(response).await;
    assert_eq!(body["status"], "shortlisted");
    assert_eq!(body["score"], 7);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/shortlist/summary")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let body = read_json(response).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn http_errors_name_the_problem() {
    let store = Arc::new(MemoryStore::default());
    store.seed("app-1", strong_applicant());
    let router = applicant_router(build_pipeline(store));

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/applicants/ghost")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/applicants/app-1/shortlist")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .expect("error present")
            .contains("no compressed document")
    );
}
