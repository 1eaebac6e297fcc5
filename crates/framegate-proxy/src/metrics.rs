//! Prometheus metrics for the framegate proxy.
//!
//! Tracks proxied traffic, upstream latency and failures, and which rewriter
//! handled each response.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};
use tracing::warn;

lazy_static! {
    /// Total number of requests answered under the mount path
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "framegate_requests_total",
        "Total number of requests handled by the proxy",
        &["method", "status"]
    )
    .unwrap();

    /// Upstream round-trip duration
    pub static ref UPSTREAM_DURATION_MS: HistogramVec = register_histogram_vec!(
        "framegate_upstream_duration_ms",
        "Duration of upstream requests in milliseconds",
        &["method"],
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 30000.0]
    )
    .unwrap();

    /// Failed upstream calls
    pub static ref UPSTREAM_ERRORS_TOTAL: CounterVec = register_counter_vec!(
        "framegate_upstream_errors_total",
        "Total number of failed upstream requests",
        &["kind"]  // kind: timeout|transport|invalid_url|body
    )
    .unwrap();

    /// Responses by rewriter
    pub static ref REWRITES_TOTAL: CounterVec = register_counter_vec!(
        "framegate_rewrites_total",
        "Upstream responses by body rewriter",
        &["kind"]  // kind: html|module|passthrough
    )
    .unwrap();

    pub static ref TARGET_CONFIGURED: Gauge = register_gauge!(
        "framegate_target_configured",
        "1 when a proxy target is configured, 0 otherwise"
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn record_request(method: &str, status: u16) {
    REQUESTS_TOTAL
        .with_label_values(&[method, &status.to_string()])
        .inc();
}

pub fn record_upstream_duration(method: &str, duration_ms: f64) {
    UPSTREAM_DURATION_MS
        .with_label_values(&[method])
        .observe(duration_ms);
}

pub fn record_upstream_error(kind: &str) {
    UPSTREAM_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_rewrite(kind: &str) {
    REWRITES_TOTAL.with_label_values(&[kind]).inc();
}

pub fn set_target_configured(configured: bool) {
    TARGET_CONFIGURED.set(if configured { 1.0 } else { 0.0 });
}
