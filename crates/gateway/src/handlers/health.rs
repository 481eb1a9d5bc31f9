//! Health check handlers

use antiplagiat_common::models::{HealthResponse, ReadyResponse};
use axum::{extract::State, http::StatusCode, Json};

use crate::{AppState, SERVICE_NAME};

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok(SERVICE_NAME))
}

/// Readiness probe - both downstream services must answer their health check
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let response = state.orchestrator.probe_dependencies().await;
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
