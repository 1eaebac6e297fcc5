//! System handlers: health, metrics.

use crate::admin_api::types::*;
use crate::metrics::collect_metrics;
use crate::response::ResponseBuilder;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// GET /health - Health check
pub fn handle_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}))
}

/// GET /metrics - Prometheus metrics
pub fn handle_metrics() -> Response<Full<Bytes>> {
    ResponseBuilder::new(StatusCode::OK)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(collect_metrics())
        .build_full()
}
