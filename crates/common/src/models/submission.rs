//! Submission contracts exchanged with the content store

use crate::errors::{AppError, Result};
use crate::hashing::ContentHash;
use crate::models::AnalyzeRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student's work as submitted by a client
///
/// Every field is optional on the wire. The gateway only insists on
/// `content`; the store fills in placeholders for missing metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NewSubmission {
    /// The submitted text, rejecting an absent or empty body
    pub fn require_content(&self) -> Result<&str> {
        match self.content.as_deref() {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(AppError::Validation {
                message: "Field 'content' is required and cannot be empty".to_string(),
                field: Some("content".to_string()),
            }),
        }
    }
}

/// The store's answer to a successful create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: i64,
    pub student_name: String,
    pub task_id: String,
    pub filename: String,
    pub content_hash: ContentHash,
    pub size_bytes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StoredSubmission {
    /// Facts the detector needs, taken verbatim from the stored record
    pub fn analyze_request(&self) -> AnalyzeRequest {
        AnalyzeRequest {
            submission_id: self.id,
            task_id: self.task_id.clone(),
            student_name: self.student_name.clone(),
            content_hash: self.content_hash.clone(),
        }
    }
}

/// Submission metadata as returned by fetch-by-id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub student_name: String,
    pub task_id: String,
    pub filename: String,
    pub content_hash: ContentHash,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// One entry of a same-hash lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub id: i64,
    pub student_name: String,
    pub task_id: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Reply of the store's find-by-hash endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashLookup {
    pub files: Vec<SubmissionSummary>,
    pub count: usize,
}

impl HashLookup {
    pub fn new(files: Vec<SubmissionSummary>) -> Self {
        Self {
            count: files.len(),
            files,
        }
    }
}

/// Reply of the store's list-by-task endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSubmissions {
    pub task_id: String,
    pub count: usize,
    pub files: Vec<Submission>,
}

impl TaskSubmissions {
    pub fn new(task_id: String, files: Vec<Submission>) -> Self {
        Self {
            task_id,
            count: files.len(),
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_required() {
        let missing = NewSubmission::default();
        assert!(missing.require_content().is_err());

        let empty = NewSubmission {
            content: Some(String::new()),
            ..Default::default()
        };
        assert!(empty.require_content().is_err());

        let present = NewSubmission {
            content: Some("X".into()),
            ..Default::default()
        };
        assert_eq!(present.require_content().unwrap(), "X");
    }

    #[test]
    fn test_absent_metadata_is_not_forwarded() {
        let submission = NewSubmission {
            student_name: Some("A".into()),
            content: Some("X".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value, json!({ "student_name": "A", "content": "X" }));
    }

    #[test]
    fn test_stored_submission_requires_core_fields() {
        let hash = ContentHash::of("X");
        let complete = json!({
            "id": 3,
            "student_name": "A",
            "task_id": "hw3",
            "filename": "essay.txt",
            "content_hash": hash.as_str(),
            "size_bytes": 1,
            "message": "File uploaded successfully"
        });
        let stored: StoredSubmission = serde_json::from_value(complete).unwrap();
        assert_eq!(stored.id, 3);
        assert!(stored.uploaded_at.is_none());

        let request = stored.analyze_request();
        assert_eq!(request.submission_id, 3);
        assert_eq!(request.student_name, "A");
        assert_eq!(request.task_id, "hw3");
        assert_eq!(request.content_hash, hash);

        let missing_hash = json!({
            "id": 3,
            "student_name": "A",
            "task_id": "hw3",
            "filename": "essay.txt",
            "size_bytes": 1
        });
        assert!(serde_json::from_value::<StoredSubmission>(missing_hash).is_err());
    }
}
