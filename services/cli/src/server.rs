use crate::cli::ServeArgs;
use crate::infra::{self, AppState, InMemoryApplicantStore};
use crate::routes::with_applicant_routes;
use applicant_ai::config::AppConfig;
use applicant_ai::error::AppError;
use applicant_ai::telemetry;
use applicant_ai::workflows::applicants::{ApplicantPipeline, PipelineError};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryApplicantStore::default());
    infra::seed_sample_applicants(&store).map_err(PipelineError::from)?;
    let gateway = Arc::new(infra::build_completion_client(&config)?);
    let pipeline = Arc::new(ApplicantPipeline::new(
        store,
        gateway,
        config.shortlist.clone(),
        config.generation.clone(),
    ));

    let app = with_applicant_routes(pipeline)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "applicant decisioning service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
