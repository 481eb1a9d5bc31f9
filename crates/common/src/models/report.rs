//! Detection contracts exchanged with the duplicate detector

use crate::hashing::ContentHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Similarity recorded for a byte-identical match
pub const FULL_MATCH_PERCENT: f64 = 100.0;

/// Similarity recorded when no earlier match exists
pub const NO_MATCH_PERCENT: f64 = 0.0;

/// Facts forwarded by the gateway so the detector never re-reads metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(range(min = 1))]
    pub submission_id: i64,

    pub task_id: String,

    pub student_name: String,

    pub content_hash: ContentHash,
}

/// Report lifecycle. Reports are only written once decided, so `Pending`
/// is never observed outside the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Completed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Completed => "completed",
        }
    }
}

impl From<String> for ReportStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "completed" => ReportStatus::Completed,
            _ => ReportStatus::Pending,
        }
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        status.as_str().to_string()
    }
}

/// All-or-nothing duplicate decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_duplicate: bool,
    pub similarity_percent: f64,
    pub matched_submission_id: Option<i64>,
}

impl Verdict {
    /// Build the verdict from the designated original, if any
    pub fn from_match(original: Option<i64>) -> Self {
        match original {
            Some(id) => Self {
                is_duplicate: true,
                similarity_percent: FULL_MATCH_PERCENT,
                matched_submission_id: Some(id),
            },
            None => Self {
                is_duplicate: false,
                similarity_percent: NO_MATCH_PERCENT,
                matched_submission_id: None,
            },
        }
    }
}

/// Persisted outcome of analysing one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub id: i64,
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

impl DetectionReport {
    pub fn verdict(&self) -> Verdict {
        Verdict {
            is_duplicate: self.is_duplicate,
            similarity_percent: self.similarity_percent,
            matched_submission_id: self.matched_submission_id,
        }
    }
}

/// Reports of one task, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReports {
    pub task_id: String,
    pub total_submissions: usize,
    pub duplicate_count: usize,
    pub reports: Vec<DetectionReport>,
}

impl TaskReports {
    pub fn new(task_id: String, reports: Vec<DetectionReport>) -> Self {
        Self {
            task_id,
            total_submissions: reports.len(),
            duplicate_count: reports.iter().filter(|r| r.is_duplicate).count(),
            reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(id: i64, is_duplicate: bool) -> DetectionReport {
        let verdict = Verdict::from_match(is_duplicate.then_some(1));
        DetectionReport {
            id,
            submission_id: id + 10,
            task_id: "hw3".into(),
            student_name: "B".into(),
            is_duplicate: verdict.is_duplicate,
            similarity_percent: verdict.similarity_percent,
            matched_submission_id: verdict.matched_submission_id,
            status: ReportStatus::Completed,
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_verdict_is_all_or_nothing() {
        let duplicate = Verdict::from_match(Some(4));
        assert!(duplicate.is_duplicate);
        assert_eq!(duplicate.similarity_percent, 100.0);
        assert_eq!(duplicate.matched_submission_id, Some(4));

        let clean = Verdict::from_match(None);
        assert!(!clean.is_duplicate);
        assert_eq!(clean.similarity_percent, 0.0);
        assert_eq!(clean.matched_submission_id, None);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(String::from(ReportStatus::Completed), "completed");
        assert_eq!(ReportStatus::from("completed".to_string()), ReportStatus::Completed);
        assert_eq!(ReportStatus::from("bogus".to_string()), ReportStatus::Pending);
        assert_eq!(serde_json::to_value(ReportStatus::Pending).unwrap(), json!("pending"));
    }

    #[test]
    fn test_analyze_request_validation() {
        let request = AnalyzeRequest {
            submission_id: 0,
            task_id: "hw3".into(),
            student_name: "A".into(),
            content_hash: ContentHash::of("X"),
        };
        assert!(request.validate().is_err());

        let request = AnalyzeRequest {
            submission_id: 1,
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_task_reports_counts_duplicates() {
        let summary = TaskReports::new("hw3".into(), vec![report(1, true), report(2, false)]);
        assert_eq!(summary.total_submissions, 2);
        assert_eq!(summary.duplicate_count, 1);
    }

    #[test]
    fn test_report_serializes_null_match() {
        let value = serde_json::to_value(report(5, false)).unwrap();
        assert_eq!(value["matched_submission_id"], json!(null));
        assert_eq!(value["status"], json!("completed"));
        assert_eq!(value["similarity_percent"], json!(0.0));
    }
}
