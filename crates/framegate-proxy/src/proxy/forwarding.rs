//! Request forwarding to the configured upstream.
//!
//! A single attempt per request: no retries, no backoff.

use super::headers::filter_request_headers;
use crate::metrics;
use bytes::Bytes;
use hyper::header::ACCEPT_ENCODING;
use hyper::{HeaderMap, Method, StatusCode};
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

/// Total time allowed for one upstream exchange.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream URL: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("upstream did not respond within {}s", UPSTREAM_TIMEOUT.as_secs())]
    Timeout { url: String },

    #[error("upstream request failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to read upstream response body: {message}")]
    Body { url: String, message: String },
}

impl ForwardError {
    /// The URL that was attempted.
    pub fn url(&self) -> &str {
        match self {
            ForwardError::InvalidUrl { url, .. }
            | ForwardError::Timeout { url }
            | ForwardError::Transport { url, .. }
            | ForwardError::Body { url, .. } => url,
        }
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::InvalidUrl { .. } => "invalid_url",
            ForwardError::Timeout { .. } => "timeout",
            ForwardError::Transport { .. } => "transport",
            ForwardError::Body { .. } => "body",
        }
    }
}

/// An upstream request, ready to send.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ForwardRequest {
    /// Build the upstream request for `sub_path` under `target`.
    ///
    /// Transport headers are dropped and the body is kept only for methods
    /// that conventionally carry one.
    pub fn new(
        target: &str,
        method: Method,
        sub_path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Self {
        let body = method_carries_body(&method).then_some(body);
        Self {
            url: build_upstream_url(target, sub_path, query),
            method,
            headers: filter_request_headers(headers),
            body,
        }
    }
}

/// `target/sub_path`, plus `?query` when the query is non-empty.
pub fn build_upstream_url(target: &str, sub_path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", target, sub_path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

pub fn method_carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Raw upstream response with a fully collected, decoded body.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Issues upstream requests through the shared pooled client.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn forward(&self, request: ForwardRequest) -> Result<UpstreamResponse, ForwardError> {
        let start = Instant::now();
        let method_label = request.method.as_str().to_string();
        let result = self.execute(request).await;

        metrics::record_upstream_duration(&method_label, start.elapsed().as_secs_f64() * 1000.0);
        if let Err(ref e) = result {
            metrics::record_upstream_error(e.kind());
            error!("Upstream request to {} failed: {}", e.url(), e);
        }
        result
    }

    async fn execute(&self, request: ForwardRequest) -> Result<UpstreamResponse, ForwardError> {
        let ForwardRequest {
            method,
            url,
            mut headers,
            body,
        } = request;

        let parsed = Url::parse(&url).map_err(|source| ForwardError::InvalidUrl {
            url: url.clone(),
            source,
        })?;

        // The client negotiates only encodings it can decode.
        headers.remove(ACCEPT_ENCODING);

        debug!("Forwarding {} {}", method, url);

        let mut builder = self.client.request(method, parsed).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ForwardError::Timeout { url: url.clone() }
            } else {
                ForwardError::Transport {
                    url: url.clone(),
                    message: error_chain(&e),
                }
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ForwardError::Timeout { url: url.clone() }
            } else {
                ForwardError::Body {
                    url: url.clone(),
                    message: error_chain(&e),
                }
            }
        })?;

        debug!("Upstream {} answered {} ({} bytes)", url, status, body.len());

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Render an error and its sources as one line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderValue, CONTENT_LENGTH, HOST};

    #[test]
    fn test_build_upstream_url() {
        assert_eq!(
            build_upstream_url("http://localhost:3000", "", None),
            "http://localhost:3000/"
        );
        assert_eq!(
            build_upstream_url("http://localhost:3000", "src/main.tsx", None),
            "http://localhost:3000/src/main.tsx"
        );
        assert_eq!(
            build_upstream_url("http://localhost:3000", "api/items", Some("page=2&q=a%20b")),
            "http://localhost:3000/api/items?page=2&q=a%20b"
        );
        assert_eq!(
            build_upstream_url("http://localhost:3000", "x", Some("")),
            "http://localhost:3000/x"
        );
    }

    #[test]
    fn test_method_carries_body() {
        assert!(method_carries_body(&Method::POST));
        assert!(method_carries_body(&Method::PUT));
        assert!(method_carries_body(&Method::PATCH));
        assert!(!method_carries_body(&Method::GET));
        assert!(!method_carries_body(&Method::DELETE));
        assert!(!method_carries_body(&Method::OPTIONS));
        assert!(!method_carries_body(&Method::HEAD));
    }

    #[test]
    fn test_forward_request_drops_body_for_get() {
        let request = ForwardRequest::new(
            "http://localhost:3000",
            Method::GET,
            "a",
            None,
            &HeaderMap::new(),
            Bytes::from_static(b"ignored"),
        );
        assert!(request.body.is_none());

        let request = ForwardRequest::new(
            "http://localhost:3000",
            Method::POST,
            "a",
            None,
            &HeaderMap::new(),
            Bytes::from_static(b"{}"),
        );
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_forward_request_filters_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("localhost:8000"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        let request = ForwardRequest::new(
            "http://localhost:3000",
            Method::PUT,
            "a",
            None,
            &headers,
            Bytes::from_static(b"{}"),
        );
        assert!(request.headers.get(HOST).is_none());
        assert!(request.headers.get(CONTENT_LENGTH).is_none());
        assert_eq!(request.headers.get("x-request-id").unwrap(), "abc");
    }

    #[test]
    fn test_error_accessors() {
        let err = ForwardError::Timeout {
            url: "http://localhost:3000/slow".to_string(),
        };
        assert_eq!(err.kind(), "timeout");
        assert_eq!(err.url(), "http://localhost:3000/slow");
        assert!(err.to_string().contains("30s"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported() {
        let forwarder = Forwarder::new(reqwest::Client::new());
        let request = ForwardRequest {
            method: Method::GET,
            url: "not a url/".to_string(),
            headers: HeaderMap::new(),
            body: None,
        };
        let err = forwarder.forward(request).await.unwrap_err();
        assert!(matches!(err, ForwardError::InvalidUrl { .. }));
        assert_eq!(err.url(), "not a url/");
    }
}
