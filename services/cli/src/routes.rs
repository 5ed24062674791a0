use crate::infra::AppState;
use applicant_ai::error::AppError;
use applicant_ai::workflows::applicants::{
    applicant_router, ApplicantPipeline, ApplicantStore, BatchReport, CancelFlag,
    CompletionGateway,
};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BatchRunRequest {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn with_applicant_routes<S, G>(pipeline: Arc<ApplicantPipeline<S, G>>) -> Router
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let batch = Router::new()
        .route("/api/v1/pipeline/run", axum::routing::post(run_all_endpoint))
        .with_state(Arc::clone(&pipeline));

    applicant_router(pipeline)
        .merge(batch)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Runs every stored applicant through consolidation, shortlist, and
/// assessment, continuing past individual failures.
pub(crate) async fn run_all_endpoint<S, G>(
    State(pipeline): State<Arc<ApplicantPipeline<S, G>>>,
    payload: Option<Json<BatchRunRequest>>,
) -> Result<Json<BatchReport>, AppError>
where
    S: ApplicantStore + 'static,
    G: CompletionGateway + 'static,
{
    let today = payload.and_then(|Json(body)| body.today);
    let report = pipeline.run_all(&CancelFlag::new(), today)?;
    Ok(Json(report))
}
