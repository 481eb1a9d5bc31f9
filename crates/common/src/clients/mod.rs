//! Clients for the downstream services
//!
//! The gateway talks to both the content store and the duplicate detector;
//! the detector talks to the content store for same-hash lookups. Each
//! dependency is consumed through a trait so services can be exercised
//! against in-process fakes.
//!
//! Transport failures and timeouts surface as
//! [`AppError::UpstreamUnavailable`]. Any HTTP reply, whatever its status,
//! is returned as an [`UpstreamResponse`] for the caller to interpret.

mod analysis;
mod http;
mod storage;

pub use analysis::HttpDuplicateAnalyzer;
pub use http::ServiceClient;
pub use storage::HttpContentStore;

use crate::errors::{AppError, Result};
use crate::hashing::ContentHash;
use crate::models::{AnalyzeRequest, NewSubmission, SubmissionSummary};
use async_trait::async_trait;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

/// Service name of the content store in logs, metrics and errors
pub const STORAGE_SERVICE: &str = "file-storage";

/// Service name of the duplicate detector in logs, metrics and errors
pub const ANALYSIS_SERVICE: &str = "file-analysis";

/// Raw reply from a downstream service
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl UpstreamResponse {
    /// JSON reply, as produced by every service in this workspace
    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    /// Decode the body into the expected contract
    pub fn parse<T: DeserializeOwned>(&self, service: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| AppError::UpstreamContractViolation {
            service: service.to_string(),
            message: e.to_string(),
        })
    }

    /// The body as JSON when it is JSON, otherwise as a plain string
    pub fn body_value(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|_| serde_json::Value::String(self.body.clone()))
    }

    /// Fail unless the status is the one the contract promises
    pub fn expect_status(self, expected: StatusCode, service: &str) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(AppError::UpstreamRejected {
                service: service.to_string(),
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Forward the reply unchanged
impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let content_type = self
            .content_type
            .as_deref()
            .and_then(|value| HeaderValue::from_str(value).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));

        (self.status, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

/// Content store operations used by the gateway
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a new submission (`201 Created` on success)
    async fn create(&self, submission: &NewSubmission) -> Result<UpstreamResponse>;

    /// Fetch submission metadata by id
    async fn fetch_by_id(&self, id: i64) -> Result<UpstreamResponse>;

    /// Probe the service's health endpoint
    async fn health(&self) -> Result<UpstreamResponse>;
}

/// Same-hash lookup used by the duplicate detector
#[async_trait]
pub trait SubmissionLookup: Send + Sync {
    /// All stored submissions sharing `hash`, in no guaranteed order
    async fn find_by_hash(&self, hash: &ContentHash) -> Result<Vec<SubmissionSummary>>;
}

/// Duplicate detector operations used by the gateway
#[async_trait]
pub trait DuplicateAnalyzer: Send + Sync {
    /// Decide and persist the report for a freshly stored submission
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<UpstreamResponse>;

    /// Report of one submission
    async fn get_report(&self, submission_id: i64) -> Result<UpstreamResponse>;

    /// Reports of one task
    async fn get_task_reports(&self, task_id: &str) -> Result<UpstreamResponse>;

    /// Probe the service's health endpoint
    async fn health(&self) -> Result<UpstreamResponse>;
}
