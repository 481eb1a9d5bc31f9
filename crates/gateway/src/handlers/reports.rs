//! Report handlers, forwarded from the duplicate detector

use antiplagiat_common::{clients::UpstreamResponse, errors::Result};
use axum::extract::{Path, State};
use tracing::instrument;

use crate::AppState;

#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<UpstreamResponse> {
    state.orchestrator.get_report(id).await
}

#[instrument(skip(state))]
pub async fn get_task_reports(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<UpstreamResponse> {
    state.orchestrator.get_task_reports(&task_id).await
}
