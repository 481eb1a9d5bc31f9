//! Generic JSON-over-HTTP client rooted at a typed base URL

use super::UpstreamResponse;
use crate::errors::{AppError, Result};
use crate::metrics::UpstreamTimer;
use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// HTTP client for one downstream service
#[derive(Debug, Clone)]
pub struct ServiceClient {
    service: String,
    base_url: Url,
    client: reqwest::Client,
}

impl ServiceClient {
    /// Create a client; `connect_timeout` bounds reaching the service,
    /// `read_timeout` bounds the whole exchange once reached
    pub fn new(
        service: &str,
        base_url: Url,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Configuration {
                message: format!("{} base URL must be http(s): {}", service, base_url),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client for {}: {}", service, e),
            })?;

        Ok(Self {
            service: service.to_string(),
            base_url,
            client,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET an endpoint
    pub async fn get(&self, operation: &'static str, segments: &[&str]) -> Result<UpstreamResponse> {
        let request = self.client.get(self.endpoint(segments));
        self.execute(operation, request).await
    }

    /// POST a JSON body to an endpoint
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        segments: &[&str],
        body: &T,
    ) -> Result<UpstreamResponse> {
        let request = self.client.post(self.endpoint(segments)).json(body);
        self.execute(operation, request).await
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<UpstreamResponse> {
        let timer = UpstreamTimer::start(&self.service, operation);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                timer.finish("unreachable");
                return Err(self.unavailable(operation, e));
            }
        };

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        // A reply cut off mid-body is as good as no reply
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                timer.finish("unreachable");
                return Err(self.unavailable(operation, e));
            }
        };

        timer.finish(status.as_str());

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }

    fn unavailable(&self, operation: &str, error: reqwest::Error) -> AppError {
        warn!(
            service = %self.service,
            operation = operation,
            timeout = error.is_timeout(),
            error = %error,
            "Upstream call failed"
        );

        AppError::UpstreamUnavailable {
            service: self.service.clone(),
            message: error.to_string(),
        }
    }
}
