use crate::cli::ServeArgs;
use crate::infra::{recommendation_catalog, result_sink, AppState};
use crate::routes::with_survey_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use screening::config::AppConfig;
use screening::error::AppError;
use screening::survey::{DirectoryQuestionSets, EvaluationService, ScoringEngine};
use screening::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
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
        frontend_dir: config.survey.frontend_dir.clone(),
    };

    let evaluation_service = Arc::new(
        EvaluationService::new(
            ScoringEngine::standard(),
            recommendation_catalog(&config.survey)?,
            result_sink(&config.storage)?,
        )
        .with_sink_timeout(config.storage.timeout),
    );
    let questions = Arc::new(DirectoryQuestionSets::new(
        config.survey.question_root.clone(),
    ));

    let app = with_survey_routes(evaluation_service, questions)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        question_root = %config.survey.question_root.display(),
        "screening survey api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
