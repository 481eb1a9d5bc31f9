//! Antiplagiat Duplicate Detector
//!
//! Decides whether a stored submission is a byte-identical copy of an
//! earlier submission by another student and keeps the resulting reports.

mod detector;
mod handlers;
mod service;

use antiplagiat_common::{
    clients::{HttpContentStore, ANALYSIS_SERVICE},
    config::AppConfig,
    db::{DbPool, ReportRepository},
    metrics,
    telemetry::{init_tracing, install_metrics_exporter, serve_until, shutdown_signal},
};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::service::DetectionService;

pub(crate) const SERVICE_NAME: &str = ANALYSIS_SERVICE;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub detector: Arc<DetectionService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    init_tracing(&config.observability);

    info!("Starting Antiplagiat Duplicate Detector v{}", antiplagiat_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    install_metrics_exporter(&config.observability)?;
    metrics::register_metrics();

    // Initialize database connection
    let db = DbPool::connect(&config.database).await?;
    let reports = ReportRepository::new(db);
    reports.ensure_schema().await?;

    // Same-hash lookups go to the content store with the short read timeout
    let lookup = HttpContentStore::for_lookup(&config.services)?;
    info!(storage_url = %config.services.storage_url, "Content store lookup configured");

    // Create app state
    let state = AppState {
        config: config.clone(),
        detector: Arc::new(DetectionService::new(Arc::new(reports), Arc::new(lookup))),
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve_until(listener, app, shutdown_signal(), config.shutdown_timeout()).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_bytes);
    let timeout =
        TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, state.config.request_timeout());

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/analyze", post(handlers::reports::analyze))
        .route("/reports/{submission_id}", get(handlers::reports::get_report))
        .route("/tasks/{task_id}/reports", get(handlers::reports::get_task_reports))
        .layer(body_limit)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}
