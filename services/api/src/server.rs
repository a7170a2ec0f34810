use crate::cli::ServeArgs;
use crate::infra::{build_calculator, AppState};
use crate::routes::with_subsidy_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ivf_subsidy::config::AppConfig;
use ivf_subsidy::error::AppError;
use ivf_subsidy::telemetry;
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

    let calculator = Arc::new(build_calculator(&config)?);

    let app = with_subsidy_routes(calculator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        history = %config.history.path.display(),
        scheme_3_from = %config.rules.cutover.current_from,
        "subsidy calculator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
