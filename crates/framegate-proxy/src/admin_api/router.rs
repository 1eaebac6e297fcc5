//! Route dispatch logic for the admin API.

use crate::admin_api::handlers::{system, target};
use crate::admin_api::types::not_found;
use crate::admin_api::AdminApi;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::{Method, Request, Response};
use tracing::{debug, warn};

pub const TARGET_PATH: &str = "/config/app-proxy";

/// Main request router
pub async fn route_request<B>(req: Request<B>, api: &AdminApi) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Admin API: {} {}", method, path);

    let mut response = route_by_path(&method, &path, req, api).await;
    apply_cors(&mut response, api.allow_origin());
    response
}

/// Route based on path
async fn route_by_path<B>(
    method: &Method,
    path: &str,
    req: Request<B>,
    api: &AdminApi,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    match (method, path) {
        (&Method::GET, "/health") => system::handle_health(),
        (&Method::GET, "/metrics") => system::handle_metrics(),
        (&Method::GET, TARGET_PATH) => target::handle_get(api.targets()),
        (&Method::POST, TARGET_PATH) => target::handle_set(req, api.targets()).await,
        (&Method::OPTIONS, TARGET_PATH) => target::handle_preflight(),
        _ => not_found(),
    }
}

fn apply_cors(response: &mut Response<Full<Bytes>>, allow_origin: &str) {
    let headers = response.headers_mut();
    match HeaderValue::from_str(allow_origin) {
        Ok(origin) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(_) => warn!("Invalid CORS allow_origin '{}', header omitted", allow_origin),
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}
