//! Content store client

use super::{ContentStore, ServiceClient, SubmissionLookup, UpstreamResponse, STORAGE_SERVICE};
use crate::config::ServicesConfig;
use crate::errors::Result;
use crate::hashing::ContentHash;
use crate::models::{HashLookup, NewSubmission, SubmissionSummary};
use async_trait::async_trait;
use axum::http::StatusCode;
use std::time::Duration;

/// HTTP client for the content store
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: ServiceClient,
}

impl HttpContentStore {
    /// Client with the regular downstream timeouts (gateway)
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        Self::with_read_timeout(config, config.read_timeout())
    }

    /// Client with the shorter lookup timeout (duplicate detector)
    pub fn for_lookup(config: &ServicesConfig) -> Result<Self> {
        Self::with_read_timeout(config, config.lookup_read_timeout())
    }

    fn with_read_timeout(config: &ServicesConfig, read_timeout: Duration) -> Result<Self> {
        let client = ServiceClient::new(
            STORAGE_SERVICE,
            config.storage_url.clone(),
            config.connect_timeout(),
            read_timeout,
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn create(&self, submission: &NewSubmission) -> Result<UpstreamResponse> {
        self.client.post_json("create", &["files"], submission).await
    }

    async fn fetch_by_id(&self, id: i64) -> Result<UpstreamResponse> {
        let id = id.to_string();
        self.client.get("fetch_by_id", &["files", id.as_str()]).await
    }

    async fn health(&self) -> Result<UpstreamResponse> {
        self.client.get("health", &["health"]).await
    }
}

#[async_trait]
impl SubmissionLookup for HttpContentStore {
    async fn find_by_hash(&self, hash: &ContentHash) -> Result<Vec<SubmissionSummary>> {
        let lookup: HashLookup = self
            .client
            .get("find_by_hash", &["files", "hash", hash.as_str()])
            .await?
            .expect_status(StatusCode::OK, STORAGE_SERVICE)?
            .parse(STORAGE_SERVICE)?;

        Ok(lookup.files)
    }
}
