//! Wire contracts shared by the gateway, storage and analysis services
//!
//! All payloads are JSON with snake_case field names.

mod report;
mod submission;

pub use report::{
    AnalyzeRequest, DetectionReport, ReportStatus, TaskReports, Verdict, FULL_MATCH_PERCENT,
    NO_MATCH_PERCENT,
};
pub use submission::{
    HashLookup, NewSubmission, StoredSubmission, Submission, SubmissionSummary, TaskSubmissions,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Body of every `/health` endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn ok(service: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
        }
    }
}

/// Outcome of one readiness check
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// Build from a probe result and the instant the probe started
    pub fn from_probe<T, E: std::fmt::Display>(result: &Result<T, E>, started: Instant) -> Self {
        match result {
            Ok(_) => Self {
                status: "up".to_string(),
                latency_ms: Some(started.elapsed().as_millis() as u64),
                error: None,
            },
            Err(e) => Self {
                status: "down".to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Body of every `/ready` endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: BTreeMap<String, CheckResult>,
}

impl ReadyResponse {
    pub fn new(checks: BTreeMap<String, CheckResult>) -> Self {
        let ready = checks.values().all(CheckResult::is_up);
        Self {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            checks,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_every_check() {
        let started = Instant::now();
        let up: Result<(), String> = Ok(());
        let down: Result<(), String> = Err("connection refused".to_string());

        let mut checks = BTreeMap::new();
        checks.insert("database".to_string(), CheckResult::from_probe(&up, started));
        assert!(ReadyResponse::new(checks).is_ready());

        let mut checks = BTreeMap::new();
        checks.insert("file-storage".to_string(), CheckResult::from_probe(&up, started));
        checks.insert("file-analysis".to_string(), CheckResult::from_probe(&down, started));
        let ready = ReadyResponse::new(checks);
        assert!(!ready.is_ready());
        assert_eq!(
            ready.checks["file-analysis"].error.as_deref(),
            Some("connection refused")
        );
    }
}
