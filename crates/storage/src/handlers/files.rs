//! Submission storage handlers

use antiplagiat_common::{
    errors::Result,
    models::{HashLookup, NewSubmission, StoredSubmission, Submission, TaskSubmissions},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

use crate::AppState;

/// Store a new submission
pub async fn upload(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredSubmission>)> {
    let Json(submission) = payload?;
    let stored = state.files.upload(submission).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Submission metadata
#[instrument(skip(state))]
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Submission>> {
    Ok(Json(state.files.get(id).await?))
}

/// Raw submission bytes as a download
#[instrument(skip(state))]
pub async fn get_content(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let content = state.files.content(id).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        content.filename.replace(['"', '\\'], "_")
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content.bytes,
    )
        .into_response())
}

/// Every submission with the given content hash
#[instrument(skip(state))]
pub async fn find_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<HashLookup>> {
    Ok(Json(state.files.find_by_hash(&hash).await?))
}

/// Every submission for a task
#[instrument(skip(state))]
pub async fn list_task_files(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskSubmissions>> {
    Ok(Json(state.files.list_task(&task_id).await?))
}
