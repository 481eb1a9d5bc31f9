//! Detection report entity

use crate::models::{DetectionReport, ReportStatus};
use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "detection_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// One report per submission
    #[sea_orm(unique)]
    pub submission_id: i64,

    #[sea_orm(column_type = "Text", indexed)]
    pub task_id: String,

    #[sea_orm(column_type = "Text")]
    pub student_name: String,

    pub is_duplicate: bool,

    #[sea_orm(column_type = "Double")]
    pub similarity_percent: f64,

    pub matched_submission_id: Option<i64>,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub created_at: DateTimeWithTimeZone,

    pub completed_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Get the report status as an enum
    pub fn report_status(&self) -> ReportStatus {
        ReportStatus::from(self.status.clone())
    }
}

impl From<Model> for DetectionReport {
    fn from(model: Model) -> Self {
        DetectionReport {
            status: model.report_status(),
            id: model.id,
            submission_id: model.submission_id,
            task_id: model.task_id,
            student_name: model.student_name,
            is_duplicate: model.is_duplicate,
            similarity_percent: model.similarity_percent,
            matched_submission_id: model.matched_submission_id,
            created_at: model.created_at.with_timezone(&Utc),
            completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
