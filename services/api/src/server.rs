use crate::cli::ServeArgs;
use crate::infra::{build_planner, AppState, UsageMetrics};
use crate::routes::app_router;
use axum_prometheus::PrometheusMetricLayer;
use mealwise::config::AppConfig;
use mealwise::discounts::DiscountSource;
use mealwise::error::AppError;
use mealwise::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
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

    let planner = build_planner(&config)?;
    info!(
        discount_source = planner.source().describe(),
        meal_assistant = planner.meal_mode(),
        search_radius_km = planner.default_radius_km(),
        "meal planner configured"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        usage: Arc::new(UsageMetrics::default()),
        planner: Arc::new(planner),
        environment: config.environment,
        assistant_model: config
            .assistant
            .is_enabled()
            .then(|| config.assistant.model.clone()),
        started_at: Instant::now(),
    };

    let app = app_router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "meal planning service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
