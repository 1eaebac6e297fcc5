//! Proxy target handlers: `/config/app-proxy`.

use crate::admin_api::types::*;
use crate::response::ResponseBuilder;
use crate::target::{normalize_target, validate_target_url, TargetStore};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use tracing::debug;

/// GET /config/app-proxy - Current target
pub fn handle_get(targets: &TargetStore) -> Response<Full<Bytes>> {
    let body = TargetResponse {
        target_url: targets.get().map(|t| t.to_string()),
    };
    json_response(StatusCode::OK, &body)
}

/// POST /config/app-proxy - Replace or clear the target
pub async fn handle_set<B>(req: Request<B>, targets: &TargetStore) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    match set_target(req, targets).await {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(e) => {
            debug!("Rejected target update: {}", e);
            e.into_response()
        }
    }
}

async fn set_target<B>(
    req: Request<B>,
    targets: &TargetStore,
) -> Result<SetTargetResponse, AdminError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let body = collect_body(req).await?;
    let request: SetTargetRequest = serde_json::from_slice(&body)?;

    let normalized = request.target_url.as_deref().and_then(normalize_target);
    if let Some(ref target) = normalized {
        validate_target_url(target)?;
    }

    let stored = targets.set(normalized.as_deref());
    Ok(SetTargetResponse {
        status: "ok".to_string(),
        target_url: stored.map(|t| t.to_string()),
    })
}

/// OPTIONS /config/app-proxy - CORS preflight
pub fn handle_preflight() -> Response<Full<Bytes>> {
    ResponseBuilder::new(StatusCode::NO_CONTENT)
        .header("Access-Control-Max-Age", "600")
        .build_full()
}
