//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.
//! Exported by `telemetry::install_metrics_exporter` when enabled.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Antiplagiat metrics
pub const METRICS_PREFIX: &str = "antiplagiat";

/// Buckets for downstream call latency (in seconds), spanning the read timeout
pub const UPSTREAM_BUCKETS: &[f64] = &[
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    5.000,  // 5s - connect timeout
    10.00,  // 10s
    30.00,  // 30s - read timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Intake metrics
    describe_counter!(
        format!("{}_submissions_received_total", METRICS_PREFIX),
        Unit::Count,
        "Submissions accepted for intake"
    );

    describe_counter!(
        format!("{}_intake_outcomes_total", METRICS_PREFIX),
        Unit::Count,
        "Intake results by response class"
    );

    // Storage metrics
    describe_counter!(
        format!("{}_submissions_stored_total", METRICS_PREFIX),
        Unit::Count,
        "Submissions persisted by the content store"
    );

    describe_counter!(
        format!("{}_submission_bytes_total", METRICS_PREFIX),
        Unit::Bytes,
        "Bytes persisted by the content store"
    );

    // Analysis metrics
    describe_counter!(
        format!("{}_analyses_total", METRICS_PREFIX),
        Unit::Count,
        "Duplicate analyses by verdict"
    );

    describe_histogram!(
        format!("{}_analysis_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Duplicate analysis latency in seconds"
    );

    // Upstream metrics
    describe_counter!(
        format!("{}_upstream_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Calls to downstream services by result"
    );

    describe_histogram!(
        format!("{}_upstream_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Downstream call latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record a downstream call
pub struct UpstreamTimer {
    start: Instant,
    service: String,
    operation: &'static str,
}

impl UpstreamTimer {
    /// Start timing a call
    pub fn start(service: &str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            service: service.to_string(),
            operation,
        }
    }

    /// Record completion; `result` is an HTTP status or "unreachable"
    pub fn finish(self, result: &str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_upstream_requests_total", METRICS_PREFIX),
            "service" => self.service.clone(),
            "operation" => self.operation,
            "result" => result.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_upstream_duration_seconds", METRICS_PREFIX),
            "service" => self.service,
            "operation" => self.operation
        )
        .record(duration);
    }
}

/// Helper to record a submission entering the gateway
pub fn record_submission_received() {
    counter!(format!("{}_submissions_received_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record the response class of an intake
pub fn record_intake_outcome(class: &'static str) {
    counter!(
        format!("{}_intake_outcomes_total", METRICS_PREFIX),
        "class" => class
    )
    .increment(1);
}

/// Helper to record a stored submission
pub fn record_submission_stored(size_bytes: usize) {
    counter!(format!("{}_submissions_stored_total", METRICS_PREFIX)).increment(1);
    counter!(format!("{}_submission_bytes_total", METRICS_PREFIX)).increment(size_bytes as u64);
}

/// Helper to record a completed analysis
pub fn record_analysis(duration_secs: f64, is_duplicate: bool) {
    let verdict = if is_duplicate { "duplicate" } else { "original" };

    counter!(
        format!("{}_analyses_total", METRICS_PREFIX),
        "verdict" => verdict
    )
    .increment(1);

    histogram!(format!("{}_analysis_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_buckets() {
        // Verify buckets are sorted and reach the read timeout
        let mut prev = 0.0;
        for &bucket in UPSTREAM_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        assert!(UPSTREAM_BUCKETS.contains(&5.0));
        assert!(UPSTREAM_BUCKETS.contains(&30.0));
    }

    #[test]
    fn test_recorders_without_exporter() {
        let timer = UpstreamTimer::start("file-storage", "create");
        timer.finish("201");
        record_submission_received();
        record_intake_outcome("created");
        record_submission_stored(12);
        record_analysis(0.01, true);
        // Just verify it runs without panic
    }
}
