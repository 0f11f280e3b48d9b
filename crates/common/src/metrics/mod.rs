//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all BrandLens metrics
pub const METRICS_PREFIX: &str = "brandlens";

/// Buckets for per-query analysis latency (dominated by the upstream call)
pub const ANALYSIS_BUCKETS: &[f64] = &[
    0.010,  // 10ms - synthetic path
    0.050,  // 50ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 60s - upstream timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Analysis metrics
    describe_counter!(
        format!("{}_analyses_total", METRICS_PREFIX),
        Unit::Count,
        "Total query analyses by outcome"
    );

    describe_histogram!(
        format!("{}_analysis_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Per-query analysis latency in seconds"
    );

    describe_counter!(
        format!("{}_upstream_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Upstream LLM calls replaced by a local fallback"
    );

    describe_counter!(
        format!("{}_queries_generated_total", METRICS_PREFIX),
        Unit::Count,
        "Tracked queries created by generation or by users"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record the outcome of one query analysis
pub fn record_analysis(duration_secs: f64, success: bool) {
    let status = if success { "completed" } else { "failed" };

    counter!(
        format!("{}_analyses_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(format!("{}_analysis_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Record that an upstream call was replaced by local logic
pub fn record_fallback(call_site: &str, reason: &str) {
    counter!(
        format!("{}_upstream_fallbacks_total", METRICS_PREFIX),
        "call_site" => call_site.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record created queries
pub fn record_queries_created(count: usize, custom: bool) {
    counter!(
        format!("{}_queries_generated_total", METRICS_PREFIX),
        "custom" => custom.to_string()
    )
    .increment(count as u64);
}
