//! Intake orchestration
//!
//! A submission is persisted first and analysed second. Once the store has
//! accepted it, nothing that happens during analysis undoes that: analysis
//! trouble becomes a partial success carrying the stored submission.

use antiplagiat_common::{
    clients::{ContentStore, DuplicateAnalyzer, UpstreamResponse, ANALYSIS_SERVICE, STORAGE_SERVICE},
    errors::AppError,
    metrics,
    models::{CheckResult, DetectionReport, NewSubmission, ReadyResponse, StoredSubmission},
    Result,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Warning attached when the detector could not be reached
pub const ANALYSIS_UNAVAILABLE_WARNING: &str = "analysis unavailable";

/// Result of one intake
#[derive(Debug)]
pub enum IntakeOutcome {
    /// Stored and analysed
    Accepted {
        submission: StoredSubmission,
        analysis: DetectionReport,
    },
    /// Stored; the detector was unreachable
    AnalysisUnavailable { submission: StoredSubmission },
    /// Stored; the detector answered with something other than a new report
    AnalysisFailed {
        submission: StoredSubmission,
        analysis_error: Value,
    },
    /// The store refused the submission; its reply is forwarded as is
    StoreRejected(UpstreamResponse),
}

impl IntakeOutcome {
    /// Response class for metrics
    pub fn class(&self) -> &'static str {
        match self {
            IntakeOutcome::Accepted { .. } => "created",
            IntakeOutcome::AnalysisUnavailable { .. } | IntakeOutcome::AnalysisFailed { .. } => {
                "partial"
            }
            IntakeOutcome::StoreRejected(_) => "failed",
        }
    }
}

impl IntoResponse for IntakeOutcome {
    fn into_response(self) -> Response {
        match self {
            IntakeOutcome::Accepted {
                submission,
                analysis,
            } => (
                StatusCode::CREATED,
                Json(json!({ "submission": submission, "analysis": analysis })),
            )
                .into_response(),
            IntakeOutcome::AnalysisUnavailable { submission } => (
                StatusCode::MULTI_STATUS,
                Json(json!({
                    "submission": submission,
                    "analysis": null,
                    "warning": ANALYSIS_UNAVAILABLE_WARNING,
                })),
            )
                .into_response(),
            IntakeOutcome::AnalysisFailed {
                submission,
                analysis_error,
            } => (
                StatusCode::MULTI_STATUS,
                Json(json!({ "submission": submission, "analysis_error": analysis_error })),
            )
                .into_response(),
            IntakeOutcome::StoreRejected(reply) => reply.into_response(),
        }
    }
}

/// Coordinates the content store and the duplicate detector
pub struct IntakeOrchestrator {
    store: Arc<dyn ContentStore>,
    analyzer: Arc<dyn DuplicateAnalyzer>,
}

impl IntakeOrchestrator {
    pub fn new(store: Arc<dyn ContentStore>, analyzer: Arc<dyn DuplicateAnalyzer>) -> Self {
        Self { store, analyzer }
    }

    /// Persist then analyse one submission. Single attempt, no retries.
    #[instrument(skip(self, submission), fields(task_id = ?submission.task_id))]
    pub async fn submit(&self, submission: NewSubmission) -> Result<IntakeOutcome> {
        submission.require_content()?;

        let reply = self.store.create(&submission).await?;
        if reply.status != StatusCode::CREATED {
            warn!(status = reply.status.as_u16(), "Content store rejected submission");
            return Ok(IntakeOutcome::StoreRejected(reply));
        }

        let stored: StoredSubmission = reply.parse(STORAGE_SERVICE)?;
        info!(
            submission_id = stored.id,
            content_hash = %stored.content_hash,
            "Submission stored"
        );

        let outcome = match self.analyzer.analyze(&stored.analyze_request()).await {
            Err(AppError::UpstreamUnavailable { message, .. }) => {
                warn!(
                    submission_id = stored.id,
                    error = %message,
                    "Submission stored but analysis unavailable"
                );
                IntakeOutcome::AnalysisUnavailable { submission: stored }
            }
            Err(e) => {
                warn!(submission_id = stored.id, error = %e, "Analysis call failed");
                IntakeOutcome::AnalysisFailed {
                    submission: stored,
                    analysis_error: Value::String(e.to_string()),
                }
            }
            Ok(reply) if reply.status == StatusCode::CREATED => {
                match reply.parse::<DetectionReport>(ANALYSIS_SERVICE) {
                    Ok(analysis) => {
                        info!(
                            submission_id = stored.id,
                            is_duplicate = analysis.is_duplicate,
                            matched_submission_id = ?analysis.matched_submission_id,
                            "Submission analysed"
                        );
                        IntakeOutcome::Accepted {
                            submission: stored,
                            analysis,
                        }
                    }
                    Err(e) => {
                        warn!(submission_id = stored.id, error = %e, "Detector returned an unreadable report");
                        IntakeOutcome::AnalysisFailed {
                            submission: stored,
                            analysis_error: reply.body_value(),
                        }
                    }
                }
            }
            Ok(reply) => {
                warn!(
                    submission_id = stored.id,
                    status = reply.status.as_u16(),
                    "Detector rejected analysis"
                );
                IntakeOutcome::AnalysisFailed {
                    submission: stored,
                    analysis_error: reply.body_value(),
                }
            }
        };

        Ok(outcome)
    }

    pub async fn get_submission(&self, id: i64) -> Result<UpstreamResponse> {
        self.store.fetch_by_id(id).await
    }

    pub async fn get_report(&self, submission_id: i64) -> Result<UpstreamResponse> {
        self.analyzer.get_report(submission_id).await
    }

    pub async fn get_task_reports(&self, task_id: &str) -> Result<UpstreamResponse> {
        self.analyzer.get_task_reports(task_id).await
    }

    /// Probe both downstream services concurrently
    pub async fn probe_dependencies(&self) -> ReadyResponse {
        let store = async {
            let start = Instant::now();
            CheckResult::from_probe(&healthy(self.store.health().await), start)
        };
        let analyzer = async {
            let start = Instant::now();
            CheckResult::from_probe(&healthy(self.analyzer.health().await), start)
        };

        let (store, analyzer) = futures::join!(store, analyzer);

        let mut checks = BTreeMap::new();
        checks.insert(STORAGE_SERVICE.to_string(), store);
        checks.insert(ANALYSIS_SERVICE.to_string(), analyzer);
        ReadyResponse::new(checks)
    }
}

fn healthy(probe: Result<UpstreamResponse>) -> std::result::Result<(), String> {
    match probe {
        Ok(reply) if reply.status.is_success() => Ok(()),
        Ok(reply) => Err(format!("health check returned {}", reply.status)),
        Err(e) => Err(e.to_string()),
    }
}

/// Record the outcome class of a finished intake
pub fn record_outcome(result: &Result<IntakeOutcome>) {
    let class = match result {
        Ok(outcome) => outcome.class(),
        Err(_) => "failed",
    };
    metrics::record_intake_outcome(class);
}
