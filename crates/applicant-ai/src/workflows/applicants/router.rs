use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::ApplicantId;
use super::llm::CompletionGateway;
use super::pipeline::{ApplicantPipeline, PipelineError};
use super::repository::{ApplicantStore, StoreError};

/// HTTP surface over the pipeline, one route per operation.
pub fn applicant_router<S, G>(pipeline: Arc<ApplicantPipeline<S, G>>) -> Router
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    Router::new()
        .route("/api/v1/applicants/:applicant_id", get(status::<S, G>))
        .route(
            "/api/v1/applicants/:applicant_id/consolidate",
            post(consolidate::<S, G>),
        )
        .route(
            "/api/v1/applicants/:applicant_id/restore",
            post(restore::<S, G>),
        )
        .route(
            "/api/v1/applicants/:applicant_id/shortlist",
            post(shortlist::<S, G>),
        )
        .route(
            "/api/v1/applicants/:applicant_id/assess",
            post(assess::<S, G>),
        )
        .route(
            "/api/v1/applicants/:applicant_id/pipeline",
            post(run_pipeline::<S, G>),
        )
        .route("/api/v1/shortlist/summary", get(shortlist_summary::<S, G>))
        .route(
            "/api/v1/assessments/summary",
            get(assessment_summary::<S, G>),
        )
        .with_state(pipeline)
}

/// Body for restore. Without a document the stored one is expanded.
#[derive(Debug, Deserialize)]
pub(crate) struct RestoreRequest {
    #[serde(default)]
    pub(crate) document: Option<String>,
}

/// Body for shortlist and full-pipeline runs. `today` pins the date
/// ongoing experience is measured against.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewRequest {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn status<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let applicant_id = ApplicantId(applicant_id);
    match pipeline.status(&applicant_id) {
        Ok(record) => (StatusCode::OK, Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn consolidate<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let applicant_id = ApplicantId(applicant_id);
    match pipeline.consolidate(&applicant_id) {
        Ok(document) => (
            StatusCode::OK,
            Json(json!({ "applicant_id": applicant_id, "document": document })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn restore<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
    Path(applicant_id): Path<String>,
    body: Option<Json<RestoreRequest>>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let applicant_id = ApplicantId(applicant_id);
    let document = body.and_then(|Json(request)| request.document);
    let result = match document {
        Some(text) => pipeline.restore_from_text(&applicant_id, &text),
        None => pipeline.restore(&applicant_id),
    };
    match result {
        Ok(dossier) => (
            StatusCode::OK,
            Json(json!({ "applicant_id": applicant_id, "dossier": dossier })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn shortlist<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
    Path(applicant_id): Path<String>,
    body: Option<Json<ReviewRequest>>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let applicant_id = ApplicantId(applicant_id);
    let today = body.and_then(|Json(request)| request.today);
    match pipeline.shortlist(&applicant_id, today) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assess<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let applicant_id = ApplicantId(applicant_id);
    match pipeline.assess(&applicant_id) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn run_pipeline<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
    Path(applicant_id): Path<String>,
    body: Option<Json<ReviewRequest>>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let applicant_id = ApplicantId(applicant_id);
    let today = body.and_then(|Json(request)| request.today);
    match pipeline.run(&applicant_id, today) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn shortlist_summary<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    match pipeline.shortlist_summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assessment_summary<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
) -> Response
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    match pipeline.assessment_summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PipelineError) -> Response {
    let status = match &error {
        PipelineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        PipelineError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        PipelineError::DocumentMissing { .. } => StatusCode::CONFLICT,
        PipelineError::Generation(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
