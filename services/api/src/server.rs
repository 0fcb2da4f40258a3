use crate::cli::ServeArgs;
use crate::infra::{AppState, BoardStore};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_portal::board::JobBoard;
use job_portal::config::{AppConfig, StorageConfig};
use job_portal::error::AppError;
use job_portal::telemetry;
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
    if let Some(url) = args.database_url.take() {
        config.storage = StorageConfig::parse(&url)?;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = BoardStore::open(&config.storage)?;
    let backend = store.label();
    let routes = match store {
        BoardStore::Memory(repository) => {
            with_board_routes(Arc::new(JobBoard::new(repository, &config.board)?))
        }
        BoardStore::Sqlite(repository) => {
            with_board_routes(Arc::new(JobBoard::new(repository, &config.board)?))
        }
    };

    let app = routes
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        storage = backend,
        transition_policy = %config.board.transition_policy,
        "job portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
