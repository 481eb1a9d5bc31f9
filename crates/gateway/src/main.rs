//! Antiplagiat API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Submission intake (store, then analyse)
//! - Rate limiting
//! - Request routing to the content store and duplicate detector
//! - Observability (logging, metrics, request ids)

mod handlers;
mod middleware;
mod orchestrator;

use antiplagiat_common::{
    clients::{HttpContentStore, HttpDuplicateAnalyzer},
    config::AppConfig,
    metrics,
    telemetry::{init_tracing, install_metrics_exporter, serve_until, shutdown_signal},
    Result,
};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::middleware::rate_limit::{rate_limit_middleware, RateLimit};
use crate::orchestrator::IntakeOrchestrator;

pub(crate) const SERVICE_NAME: &str = "gateway";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<IntakeOrchestrator>,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    init_tracing(&config.observability);

    info!("Starting Antiplagiat API Gateway v{}", antiplagiat_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    install_metrics_exporter(&config.observability)?;
    metrics::register_metrics();

    // Downstream clients
    let store = HttpContentStore::new(&config.services)?;
    let analyzer = HttpDuplicateAnalyzer::new(&config.services)?;
    info!(
        storage_url = %config.services.storage_url,
        analysis_url = %config.services.analysis_url,
        "Downstream services configured"
    );

    // Create app state
    let state = AppState {
        config: config.clone(),
        orchestrator: Arc::new(IntakeOrchestrator::new(Arc::new(store), Arc::new(analyzer))),
    };

    // Build the router
    let app = create_router(state)?;

    // Start the server
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve_until(listener, app, shutdown_signal(), config.shutdown_timeout()).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Result<Router> {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let mut api_routes = Router::new()
        .route("/submissions", post(handlers::submissions::submit))
        .route("/submissions/{id}", get(handlers::submissions::get_submission))
        .route("/submissions/{id}/report", get(handlers::reports::get_report))
        .route("/tasks/{task_id}/reports", get(handlers::reports::get_task_reports));

    if config.rate_limit.enabled {
        let limit = RateLimit::new(&config.rate_limit)?;
        api_routes = api_routes.route_layer(axum::middleware::from_fn_with_state(
            limit,
            rate_limit_middleware,
        ));
    }

    // Compose the app
    Ok(Router::new()
        .route("/", get(handlers::root::index))
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(GlobalConcurrencyLimitLayer::new(config.server.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state))
}
