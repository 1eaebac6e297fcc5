//! HTML pages served from the mount path when nothing is proxied.

use super::builder::ResponseBuilder;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

const NO_APP_CONFIGURED: &str =
    "<h1>No app configured</h1><p>Use the URL input above to load an app.</p>";

/// 200 page shown while no target is configured.
pub fn no_app_configured() -> Response<Full<Bytes>> {
    ResponseBuilder::new(StatusCode::OK)
        .header("content-type", HTML_CONTENT_TYPE)
        .body(NO_APP_CONFIGURED)
        .build_full()
}

/// 502 page naming the transport error and the URL that was attempted.
pub fn proxy_error(error: &str, target_url: &str) -> Response<Full<Bytes>> {
    let body = format!(
        "<h1>Proxy Error</h1><p>{}</p><p>Target: {}</p>",
        escape_html(error),
        escape_html(target_url)
    );
    ResponseBuilder::new(StatusCode::BAD_GATEWAY)
        .header("content-type", HTML_CONTENT_TYPE)
        .body(body)
        .build_full()
}

fn escape_html(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
