//! Configuration and operational endpoints served outside the mount path.
//!
//! - `GET|POST|OPTIONS /config/app-proxy` reads or replaces the proxy target
//! - `GET /health` liveness
//! - `GET /metrics` Prometheus exposition
//!
//! Every response carries CORS headers so a host page on another origin can
//! drive the proxy.

mod handlers;
mod router;
mod types;

pub use router::TARGET_PATH;
pub use types::{SetTargetRequest, SetTargetResponse, TargetResponse};

use crate::target::TargetStore;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response};
use std::sync::Arc;

pub struct AdminApi {
    targets: Arc<TargetStore>,
    allow_origin: String,
}

impl AdminApi {
    pub fn new(targets: Arc<TargetStore>, allow_origin: impl Into<String>) -> Self {
        Self {
            targets,
            allow_origin: allow_origin.into(),
        }
    }

    pub fn targets(&self) -> &TargetStore {
        &self.targets
    }

    pub fn allow_origin(&self) -> &str {
        &self.allow_origin
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        router::route_request(req, self).await
    }
}
