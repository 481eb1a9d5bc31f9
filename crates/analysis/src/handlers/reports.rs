//! Analysis and report handlers

use antiplagiat_common::{
    errors::Result,
    models::{AnalyzeRequest, DetectionReport, TaskReports},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

use crate::service::AnalysisOutcome;
use crate::AppState;

impl IntoResponse for AnalysisOutcome {
    fn into_response(self) -> Response {
        let status = match self {
            AnalysisOutcome::Created(_) => StatusCode::CREATED,
            AnalysisOutcome::Existing(_) => StatusCode::OK,
        };
        (status, Json(self.report().clone())).into_response()
    }
}

/// Analyze a freshly stored submission
pub async fn analyze(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<AnalysisOutcome> {
    let Json(request) = payload?;
    state.detector.analyze(request).await
}

/// Report of one submission
#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
    Path(submission_id): Path<i64>,
) -> Result<Json<DetectionReport>> {
    Ok(Json(state.detector.get_report(submission_id).await?))
}

/// Reports of one task, newest first
#[instrument(skip(state))]
pub async fn get_task_reports(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskReports>> {
    Ok(Json(state.detector.task_reports(&task_id).await?))
}
