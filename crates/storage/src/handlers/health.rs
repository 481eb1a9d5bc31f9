//! Health check handlers

use antiplagiat_common::models::{CheckResult, HealthResponse, ReadyResponse};
use axum::{extract::State, http::StatusCode, Json};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::{AppState, SERVICE_NAME};

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok(SERVICE_NAME))
}

/// Readiness probe - checks the database
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();
    let database = state.files.ping().await;

    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), CheckResult::from_probe(&database, start));

    let response = ReadyResponse::new(checks);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
