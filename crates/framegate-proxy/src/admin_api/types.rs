//! Request/response payloads and response helpers for the admin API.

use crate::response::ResponseBuilder;
use crate::target::InvalidTarget;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `POST /config/app-proxy`. `null`, `""` or a missing field clears the target.
#[derive(Debug, Deserialize)]
pub struct SetTargetRequest {
    #[serde(default)]
    pub target_url: Option<String>,
}

/// Reply to a successful `POST /config/app-proxy`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetTargetResponse {
    pub status: String,
    pub target_url: Option<String>,
}

/// Reply to `GET /config/app-proxy`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetResponse {
    pub target_url: Option<String>,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

/// Individual error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        error_response(self.status(), &self.to_string())
    }
}

// =============================================================================
// Response helper functions
// =============================================================================

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    ResponseBuilder::new(status)
        .header("Content-Type", "application/json")
        .body(json)
        .build_full()
}

/// Create an error response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse {
        errors: vec![ErrorDetail {
            code: status.as_str().to_string(),
            message: message.to_string(),
        }],
    };
    json_response(status, &error)
}

/// Create a not found response
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Collect request body into bytes
pub async fn collect_body<B>(req: Request<B>) -> Result<Bytes, AdminError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    req.into_body()
        .collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| AdminError::Body(e.to_string()))
}
