//! Per-request orchestration for the mount path.
//!
//! Reads the current target, forwards the request, then rewrites the
//! upstream response so the app runs under the proxy origin:
//! - no target: informational 200 page, no upstream call
//! - transport failure: 502 page naming the error and attempted URL
//! - upstream response: headers and body rewritten, original status kept

use super::forwarding::{ForwardRequest, Forwarder, UpstreamResponse};
use super::headers::rewrite_response_headers;
use crate::metrics;
use crate::response::{pages, ResponseBuilder};
use crate::rewrite::{rewrite_body, ContentKind, RewriteContext, MOUNT_PREFIX};
use crate::target::TargetStore;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

/// Sub-path below the mount, without its leading slash.
///
/// `/app` and `/app/` map to `""`; paths outside the mount yield `None`.
pub fn mount_sub_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(MOUNT_PREFIX)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}

/// Inbound request reduced to what the upstream needs.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub sub_path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub struct ProxyDispatcher {
    targets: Arc<TargetStore>,
    forwarder: Forwarder,
}

impl ProxyDispatcher {
    pub fn new(targets: Arc<TargetStore>, forwarder: Forwarder) -> Self {
        Self { targets, forwarder }
    }

    /// Handle a hyper request addressed to the mount path.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let method = parts.method.clone();

        let Some(sub_path) = mount_sub_path(parts.uri.path()) else {
            return ResponseBuilder::new(StatusCode::NOT_FOUND).build_full();
        };
        let sub_path = sub_path.to_string();

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("Failed to read request body for {} {}: {}", method, parts.uri, e);
                return ResponseBuilder::new(StatusCode::BAD_REQUEST)
                    .header("content-type", "text/plain; charset=utf-8")
                    .body("Failed to read request body")
                    .build_full();
            }
        };

        let inbound = InboundRequest {
            method: method.clone(),
            sub_path,
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        };

        let response = self.dispatch(inbound).await;
        metrics::record_request(method.as_str(), response.status().as_u16());
        response
    }

    /// Run one request through the pipeline.
    pub async fn dispatch(&self, inbound: InboundRequest) -> Response<Full<Bytes>> {
        let Some(target) = self.targets.get() else {
            debug!("No target configured, serving placeholder for /{}", inbound.sub_path);
            return pages::no_app_configured();
        };

        let is_head = inbound.method == Method::HEAD;
        let request = ForwardRequest::new(
            &target,
            inbound.method,
            &inbound.sub_path,
            inbound.query.as_deref(),
            &inbound.headers,
            inbound.body,
        );

        match self.forwarder.forward(request).await {
            Ok(upstream) => {
                rewrite_upstream_response(upstream, &RewriteContext::new(&target), is_head)
            }
            Err(e) => pages::proxy_error(&e.to_string(), e.url()),
        }
    }
}

/// Apply header and body rewriting to a successful upstream response.
pub fn rewrite_upstream_response(
    upstream: UpstreamResponse,
    ctx: &RewriteContext,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let UpstreamResponse {
        status,
        headers,
        body,
    } = upstream;

    let mut headers = rewrite_response_headers(&headers, ctx);

    let bodiless = status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED;
    let kind = if is_head || bodiless {
        ContentKind::Other
    } else {
        ContentKind::from_content_type(headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()))
    };
    metrics::record_rewrite(kind.as_str());

    let body = match rewrite_body(kind, &body, ctx) {
        Some(rewritten) => {
            debug!(
                "Rewrote {} body ({} -> {} bytes)",
                kind.as_str(),
                body.len(),
                rewritten.len()
            );
            if headers.contains_key(CONTENT_LENGTH) {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
            }
            rewritten
        }
        None => body,
    };

    ResponseBuilder::new(status).headers(headers).body(body).build_full()
}
