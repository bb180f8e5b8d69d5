use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryProjectRepository};
use crate::routes::with_compliance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ncc_compliance::compliance::{ComplianceService, RuleTableCache};
use ncc_compliance::config::AppConfig;
use ncc_compliance::error::AppError;
use ncc_compliance::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    // The server never starts without a complete rule table.
    let rules = Arc::new(RuleTableCache::new(config.rules.descriptor()));
    let table = rules.get().map_err(|err| {
        error!(section = err.section(), error = %err, "rule table failed to load");
        err
    })?;
    info!(
        sections = table.len(),
        base_path = %config.rules.base_path.display(),
        "rule table ready"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryProjectRepository::default());
    let compliance_service = Arc::new(ComplianceService::new(repository, rules));

    let app = with_compliance_routes(compliance_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "compliance service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
