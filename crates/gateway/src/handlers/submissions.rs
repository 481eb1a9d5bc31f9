//! Submission intake handlers

use antiplagiat_common::{clients::UpstreamResponse, errors::Result, metrics, models::NewSubmission};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::instrument;

use crate::orchestrator::{record_outcome, IntakeOutcome};
use crate::AppState;

/// Store a submission and run duplicate analysis on it
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewSubmission>, JsonRejection>,
) -> Result<IntakeOutcome> {
    metrics::record_submission_received();

    let result = match payload {
        Ok(Json(submission)) => state.orchestrator.submit(submission).await,
        Err(rejection) => Err(rejection.into()),
    };

    record_outcome(&result);
    result
}

/// Submission metadata, forwarded from the content store
#[instrument(skip(state))]
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<UpstreamResponse> {
    state.orchestrator.get_submission(id).await
}
