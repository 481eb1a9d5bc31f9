//! Submission entity

use crate::errors::AppError;
use crate::hashing::ContentHash;
use crate::models::{StoredSubmission, Submission, SubmissionSummary};
use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    /// Assigned in insertion order; doubles as the upload-order timestamp
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub student_name: String,

    #[sea_orm(column_type = "Text", indexed)]
    pub task_id: String,

    #[sea_orm(column_type = "Text")]
    pub filename: String,

    /// Location of the bytes on disk
    #[sea_orm(column_type = "Text")]
    pub file_path: String,

    #[sea_orm(column_type = "Text", indexed)]
    pub content_hash: String,

    pub size_bytes: i64,

    pub uploaded_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn content_hash(&self) -> crate::errors::Result<ContentHash> {
        ContentHash::parse(&self.content_hash).map_err(|_| AppError::Internal {
            message: format!("Stored submission {} has a malformed content hash", self.id),
        })
    }

    /// Create response for this freshly inserted record
    pub fn to_stored(&self) -> crate::errors::Result<StoredSubmission> {
        Ok(StoredSubmission {
            id: self.id,
            student_name: self.student_name.clone(),
            task_id: self.task_id.clone(),
            filename: self.filename.clone(),
            content_hash: self.content_hash()?,
            size_bytes: self.size_bytes,
            uploaded_at: Some(self.uploaded_at.with_timezone(&Utc)),
            message: Some("File uploaded successfully".to_string()),
        })
    }
}

impl TryFrom<Model> for Submission {
    type Error = AppError;

    fn try_from(model: Model) -> crate::errors::Result<Self> {
        Ok(Submission {
            content_hash: model.content_hash()?,
            id: model.id,
            student_name: model.student_name,
            task_id: model.task_id,
            filename: model.filename,
            size_bytes: model.size_bytes,
            uploaded_at: model.uploaded_at.with_timezone(&Utc),
        })
    }
}

impl From<Model> for SubmissionSummary {
    fn from(model: Model) -> Self {
        SubmissionSummary {
            id: model.id,
            student_name: model.student_name,
            task_id: model.task_id,
            filename: model.filename,
            uploaded_at: model.uploaded_at.with_timezone(&Utc),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(content_hash: String) -> Model {
        Model {
            id: 3,
            student_name: "A".to_string(),
            task_id: "hw3".to_string(),
            filename: "essay.txt".to_string(),
            file_path: "uploads/essay.txt".to_string(),
            content_hash,
            size_bytes: 5,
            uploaded_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_row_conversions() {
        let hash = ContentHash::of("hello");
        let model = row(hash.to_string());

        let stored = model.to_stored().unwrap();
        assert_eq!(stored.id, 3);
        assert_eq!(stored.content_hash, hash);
        assert!(stored.message.is_some());

        let submission = Submission::try_from(model.clone()).unwrap();
        assert_eq!(submission.content_hash, hash);
        assert_eq!(submission.size_bytes, 5);

        let summary = SubmissionSummary::from(model);
        assert_eq!(summary.filename, "essay.txt");
    }

    #[test]
    fn test_malformed_stored_hash() {
        let model = row("not-a-digest".to_string());

        assert!(matches!(model.to_stored(), Err(AppError::Internal { .. })));
        assert!(Submission::try_from(model).is_err());
    }
}
