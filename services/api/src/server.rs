use crate::cli::ServeArgs;
use crate::infra::{demo_portfolio, AppState, TracingInvalidator};
use crate::routes::with_leasing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use renta_core::config::AppConfig;
use renta_core::error::AppError;
use renta_core::leasing::service::LeasingService;
use renta_core::telemetry;
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

    let portfolio = demo_portfolio();
    let cache = Arc::new(TracingInvalidator);
    let leasing_service = Arc::new(LeasingService::new(portfolio, cache));

    let app = with_leasing_routes(leasing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rental operations service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
