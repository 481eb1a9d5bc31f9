//! Repository pattern for database operations
//!
//! One repository per table. The content store only ever touches
//! `submissions`, the duplicate detector only `detection_reports`.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::models::ReportStatus;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, SqlErr,
};

/// Fields of a submission about to be inserted
#[derive(Debug, Clone)]
pub struct NewSubmissionRecord {
    pub student_name: String,
    pub task_id: String,
    pub filename: String,
    pub file_path: String,
    pub content_hash: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Fields of a report about to be inserted
#[derive(Debug, Clone)]
pub struct NewDetectionReport {
    pub submission_id: i64,
    pub task_id: String,
    pub student_name: String,
    pub is_duplicate: bool,
    pub similarity_percent: f64,
    pub matched_submission_id: Option<i64>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Repository for the `submissions` table
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: DbPool,
}

impl SubmissionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Create the table and its indexes when missing
    pub async fn ensure_schema(&self) -> Result<()> {
        self.pool.ensure_schema(SubmissionEntity).await
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Insert a submission; the database assigns the id
    pub async fn create(&self, record: NewSubmissionRecord) -> Result<SubmissionRecord> {
        let submission = SubmissionActiveModel {
            id: NotSet,
            student_name: Set(record.student_name),
            task_id: Set(record.task_id),
            filename: Set(record.filename),
            file_path: Set(record.file_path),
            content_hash: Set(record.content_hash),
            size_bytes: Set(record.size_bytes),
            uploaded_at: Set(record.uploaded_at.into()),
        };

        submission.insert(self.conn()).await.map_err(Into::into)
    }

    /// Find submission by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<SubmissionRecord>> {
        SubmissionEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// All submissions with the given content hash, oldest first
    pub async fn find_by_hash(&self, content_hash: &str) -> Result<Vec<SubmissionRecord>> {
        SubmissionEntity::find()
            .filter(SubmissionColumn::ContentHash.eq(content_hash))
            .order_by_asc(SubmissionColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// All submissions for a task, oldest first
    pub async fn find_by_task(&self, task_id: &str) -> Result<Vec<SubmissionRecord>> {
        SubmissionEntity::find()
            .filter(SubmissionColumn::TaskId.eq(task_id))
            .order_by_asc(SubmissionColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }
}

/// Repository for the `detection_reports` table
#[derive(Clone)]
pub struct ReportRepository {
    pool: DbPool,
}

impl ReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Create the table and its indexes when missing
    pub async fn ensure_schema(&self) -> Result<()> {
        self.pool.ensure_schema(DetectionReportEntity).await
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Insert a report. A second report for the same submission is a
    /// [`AppError::Conflict`].
    pub async fn create(&self, report: NewDetectionReport) -> Result<DetectionReportRecord> {
        let submission_id = report.submission_id;
        let record = DetectionReportActiveModel {
            id: NotSet,
            submission_id: Set(report.submission_id),
            task_id: Set(report.task_id),
            student_name: Set(report.student_name),
            is_duplicate: Set(report.is_duplicate),
            similarity_percent: Set(report.similarity_percent),
            matched_submission_id: Set(report.matched_submission_id),
            status: Set(report.status.into()),
            created_at: Set(report.created_at.into()),
            completed_at: Set(report.completed_at.map(Into::into)),
        };

        record.insert(self.conn()).await.map_err(|err| conflict_or(err, submission_id))
    }

    /// Report for a submission
    pub async fn find_by_submission(
        &self,
        submission_id: i64,
    ) -> Result<Option<DetectionReportRecord>> {
        DetectionReportEntity::find()
            .filter(DetectionReportColumn::SubmissionId.eq(submission_id))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// All reports for a task, newest first
    pub async fn find_by_task(&self, task_id: &str) -> Result<Vec<DetectionReportRecord>> {
        DetectionReportEntity::find()
            .filter(DetectionReportColumn::TaskId.eq(task_id))
            .order_by_desc(DetectionReportColumn::CreatedAt)
            .order_by_desc(DetectionReportColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }
}

fn conflict_or(err: DbErr, submission_id: i64) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict {
            message: format!("Report for submission {} already exists", submission_id),
        },
        _ => err.into(),
    }
}
