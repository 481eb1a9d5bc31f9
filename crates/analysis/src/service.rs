//! Detection workflow: committed-report check, same-hash lookup,
//! decision, persistence.
//!
//! The lookup and the report write are separate operations. Two identical
//! submissions analysed concurrently can each miss the other and both be
//! reported clean.

use antiplagiat_common::{
    clients::SubmissionLookup,
    db::{models::DetectionReportRecord, NewDetectionReport, ReportRepository},
    errors::AppError,
    metrics,
    models::{AnalyzeRequest, DetectionReport, ReportStatus, TaskReports},
    Result,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use validator::Validate;

use crate::detector;

/// Persistence of detection reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a report; a second report for the same submission is a `Conflict`
    async fn insert(&self, report: NewDetectionReport) -> Result<DetectionReportRecord>;

    async fn find_by_submission(&self, submission_id: i64) -> Result<Option<DetectionReportRecord>>;

    /// Newest first
    async fn find_by_task(&self, task_id: &str) -> Result<Vec<DetectionReportRecord>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
impl ReportStore for ReportRepository {
    async fn insert(&self, report: NewDetectionReport) -> Result<DetectionReportRecord> {
        self.create(report).await
    }

    async fn find_by_submission(&self, submission_id: i64) -> Result<Option<DetectionReportRecord>> {
        ReportRepository::find_by_submission(self, submission_id).await
    }

    async fn find_by_task(&self, task_id: &str) -> Result<Vec<DetectionReportRecord>> {
        ReportRepository::find_by_task(self, task_id).await
    }

    async fn ping(&self) -> Result<()> {
        ReportRepository::ping(self).await
    }
}

/// Result of an analyze call
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// A new decision was made and committed
    Created(DetectionReport),
    /// The submission already had a committed report
    Existing(DetectionReport),
}

impl AnalysisOutcome {
    pub fn report(&self) -> &DetectionReport {
        match self {
            AnalysisOutcome::Created(report) | AnalysisOutcome::Existing(report) => report,
        }
    }
}

pub struct DetectionService {
    reports: Arc<dyn ReportStore>,
    lookup: Arc<dyn SubmissionLookup>,
}

impl DetectionService {
    pub fn new(reports: Arc<dyn ReportStore>, lookup: Arc<dyn SubmissionLookup>) -> Self {
        Self { reports, lookup }
    }

    /// Decide and persist the report for a stored submission.
    ///
    /// Fails without writing anything when the lookup cannot be answered.
    #[instrument(skip(self, request), fields(submission_id = request.submission_id))]
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisOutcome> {
        request.validate()?;

        if let Some(existing) = self.reports.find_by_submission(request.submission_id).await? {
            info!("Report already committed");
            return Ok(AnalysisOutcome::Existing(existing.into()));
        }

        let started = Instant::now();
        let candidates = self.lookup.find_by_hash(&request.content_hash).await?;
        let verdict = detector::decide(&candidates, &request);

        let now = Utc::now();
        let inserted = self
            .reports
            .insert(NewDetectionReport {
                submission_id: request.submission_id,
                task_id: request.task_id.clone(),
                student_name: request.student_name.clone(),
                is_duplicate: verdict.is_duplicate,
                similarity_percent: verdict.similarity_percent,
                matched_submission_id: verdict.matched_submission_id,
                status: ReportStatus::Completed,
                created_at: now,
                completed_at: Some(now),
            })
            .await;

        let record = match inserted {
            Ok(record) => record,
            Err(AppError::Conflict { .. }) => {
                // Lost a race with a concurrent analyze of the same submission
                let winner = self
                    .reports
                    .find_by_submission(request.submission_id)
                    .await?
                    .ok_or(AppError::ReportNotFound {
                        submission_id: request.submission_id,
                    })?;
                return Ok(AnalysisOutcome::Existing(winner.into()));
            }
            Err(e) => return Err(e),
        };

        metrics::record_analysis(started.elapsed().as_secs_f64(), verdict.is_duplicate);
        info!(
            task_id = %request.task_id,
            candidates = candidates.len(),
            is_duplicate = verdict.is_duplicate,
            matched_submission_id = ?verdict.matched_submission_id,
            "Analysis completed"
        );

        Ok(AnalysisOutcome::Created(record.into()))
    }

    pub async fn get_report(&self, submission_id: i64) -> Result<DetectionReport> {
        self.reports
            .find_by_submission(submission_id)
            .await?
            .map(DetectionReport::from)
            .ok_or(AppError::ReportNotFound { submission_id })
    }

    pub async fn task_reports(&self, task_id: &str) -> Result<TaskReports> {
        let reports = self
            .reports
            .find_by_task(task_id)
            .await?
            .into_iter()
            .map(DetectionReport::from)
            .collect();

        Ok(TaskReports::new(task_id.to_string(), reports))
    }

    pub async fn ping(&self) -> Result<()> {
        self.reports.ping().await
    }
}
