//! Duplicate detector client

use super::{DuplicateAnalyzer, ServiceClient, UpstreamResponse, ANALYSIS_SERVICE};
use crate::config::ServicesConfig;
use crate::errors::Result;
use crate::models::AnalyzeRequest;
use async_trait::async_trait;

/// HTTP client for the duplicate detector
#[derive(Debug, Clone)]
pub struct HttpDuplicateAnalyzer {
    client: ServiceClient,
}

impl HttpDuplicateAnalyzer {
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        let client = ServiceClient::new(
            ANALYSIS_SERVICE,
            config.analysis_url.clone(),
            config.connect_timeout(),
            config.read_timeout(),
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DuplicateAnalyzer for HttpDuplicateAnalyzer {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<UpstreamResponse> {
        self.client.post_json("analyze", &["analyze"], request).await
    }

    async fn get_report(&self, submission_id: i64) -> Result<UpstreamResponse> {
        let submission_id = submission_id.to_string();
        self.client
            .get("get_report", &["reports", submission_id.as_str()])
            .await
    }

    async fn get_task_reports(&self, task_id: &str) -> Result<UpstreamResponse> {
        self.client
            .get("get_task_reports", &["tasks", task_id, "reports"])
            .await
    }

    async fn health(&self) -> Result<UpstreamResponse> {
        self.client.get("health", &["health"]).await
    }
}
