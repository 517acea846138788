use crate::cli::ServeArgs;
use crate::infra::{seed_demo_lease, shift_days, AppState};
use crate::routes::with_disposition_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use deposit_disposition::config::{AppConfig, AppEnvironment};
use deposit_disposition::error::AppError;
use deposit_disposition::telemetry;
use deposit_disposition::workflows::move_out::{DispositionService, InMemoryDispositionStore};
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

    let jurisdiction = config.jurisdiction.jurisdiction.clone();
    let store = Arc::new(InMemoryDispositionStore::default());
    if config.environment != AppEnvironment::Production {
        let move_out = shift_days(Local::now().date_naive(), -7, "today")?;
        let lease_id = seed_demo_lease(&store, move_out)?;
        info!(%lease_id, %move_out, "seeded demo lease");
    }
    let service = Arc::new(DispositionService::new(store, config.jurisdiction.clone()));

    let app = with_disposition_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, %jurisdiction, "deposit disposition service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
