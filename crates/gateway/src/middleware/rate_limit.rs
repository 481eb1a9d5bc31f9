//! Rate limiting middleware using token bucket algorithm

use antiplagiat_common::{config::RateLimitConfig, errors::AppError, Result};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Shared limiter plus the configured rate for error reporting
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultDirectRateLimiter>,
    requests_per_second: u32,
}

impl RateLimit {
    /// Create a new rate limiter
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let rate = NonZeroU32::new(config.requests_per_second).ok_or(AppError::Configuration {
            message: "rate_limit.requests_per_second must be positive".to_string(),
        })?;
        let burst = NonZeroU32::new(config.burst).ok_or(AppError::Configuration {
            message: "rate_limit.burst must be positive".to_string(),
        })?;

        let quota = Quota::per_second(rate).allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            requests_per_second: config.requests_per_second,
        })
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limit): State<RateLimit>,
    request: Request,
    next: Next,
) -> Result<Response> {
    match limit.limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            Err(AppError::RateLimited {
                limit: limit.requests_per_second,
            })
        }
    }
}
