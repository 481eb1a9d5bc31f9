//! Antiplagiat Content Store
//!
//! Owns submission bytes and metadata:
//! - Accepts new submissions and fingerprints their content
//! - Serves metadata and raw bytes by id
//! - Answers same-hash lookups for the duplicate detector

mod blob;
mod handlers;
mod service;

use antiplagiat_common::{
    clients::STORAGE_SERVICE,
    config::AppConfig,
    db::{DbPool, SubmissionRepository},
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

use crate::blob::BlobStore;
use crate::service::FileService;

pub(crate) const SERVICE_NAME: &str = STORAGE_SERVICE;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub files: Arc<FileService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    init_tracing(&config.observability);

    info!("Starting Antiplagiat Content Store v{}", antiplagiat_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    install_metrics_exporter(&config.observability)?;
    metrics::register_metrics();

    // Initialize database connection
    let db = DbPool::connect(&config.database).await?;
    let repository = SubmissionRepository::new(db);
    repository.ensure_schema().await?;

    let blobs = BlobStore::new(&config.storage.upload_dir);
    blobs.init().await?;
    info!(upload_dir = %config.storage.upload_dir, "Blob storage ready");

    // Create app state
    let state = AppState {
        config: config.clone(),
        files: Arc::new(FileService::new(Arc::new(repository), blobs)),
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
        .route("/files", post(handlers::files::upload))
        .route("/files/{id}", get(handlers::files::get_file))
        .route("/files/{id}/content", get(handlers::files::get_content))
        .route("/files/hash/{hash}", get(handlers::files::find_by_hash))
        .route("/tasks/{task_id}/files", get(handlers::files::list_task_files))
        .layer(body_limit)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use antiplagiat_common::{models::HashLookup, ContentHash};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(dir: &std::path::Path) -> Router {
        create_router(AppState {
            config: Arc::new(AppConfig::default()),
            files: Arc::new(service::tests::service(dir)),
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await,
            json!({ "status": "ok", "service": "file-storage" })
        );
    }

    #[tokio::test]
    async fn test_upload_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let response = app
            .clone()
            .oneshot(post_json(
                "/files",
                json!({ "student_name": "ann", "task_id": "hw1", "filename": "a.txt", "content": "hello" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let stored = read_json(response).await;
        assert_eq!(stored["content_hash"], json!(ContentHash::of("hello").as_str()));
        let id = stored["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(Request::get(format!("/files/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["student_name"], json!("ann"));

        let response = app
            .oneshot(
                Request::get(format!("/files/{}/content", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a.txt\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_upload_without_content() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json("/files", json!({ "student_name": "ann" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_upload_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::post("/files")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app(dir.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_over_body_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.server.max_body_bytes = 64;
        let app = create_router(AppState {
            config: Arc::new(config),
            files: Arc::new(service::tests::service(dir.path())),
        });

        let response = app
            .oneshot(post_json("/files", json!({ "content": "x".repeat(1000) })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(read_json(response).await["error"]["code"], json!("PAYLOAD_TOO_LARGE"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::get("/files/42").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hash_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        for student in ["ann", "bob"] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/files",
                    json!({ "student_name": student, "task_id": "hw1", "content": "shared" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let uri = format!("/files/hash/{}", ContentHash::of("shared"));
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let lookup: HashLookup = serde_json::from_value(read_json(response).await).unwrap();
        assert_eq!(lookup.count, 2);

        let response = app
            .oneshot(Request::get("/files/hash/xyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_task_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let response = app
            .clone()
            .oneshot(post_json("/files", json!({ "task_id": "lab 2", "content": "x" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::get("/tasks/lab%202/files")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["task_id"], json!("lab 2"));
        assert_eq!(body["count"], json!(1));
    }
}
