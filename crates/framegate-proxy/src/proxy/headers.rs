//! Header filtering and rewriting for both proxy legs.
//!
//! Outbound: transport-specific request headers are dropped before the call
//! to the upstream.
//!
//! Inbound: response headers are cleaned so the upstream app can run framed
//! under the proxy's origin. Hop-by-hop headers are dropped, `Set-Cookie` is
//! made host-only and `SameSite=Lax`, and `X-Frame-Options` and CSP
//! `frame-ancestors` are removed. Everything else is copied as-is, keeping
//! multiplicity.

use crate::rewrite::{is_local_host, RewriteContext};
use hyper::header::{
    HeaderName, HeaderValue, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_SECURITY_POLICY, HOST, SET_COOKIE, TRANSFER_ENCODING, X_FRAME_OPTIONS,
};
use hyper::HeaderMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub static KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");

static DOMAIN_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i);\s*domain\s*=\s*(?P<domain>[^;]*)").expect("valid cookie domain regex")
});
static SAMESITE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i);\s*samesite\b[^;]*").expect("valid cookie samesite regex"));
static SECURE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i);\s*secure\b").expect("valid cookie secure regex"));

const SAMESITE_LAX: &str = "; SameSite=Lax";

/// Copy inbound request headers minus the transport-specific ones.
pub fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if is_transport_request_header(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Request headers that are never forwarded to the upstream.
fn is_transport_request_header(name: &HeaderName) -> bool {
    name == HOST || name == CONTENT_LENGTH || name == TRANSFER_ENCODING || name == CONNECTION
}

/// Response headers that never survive the proxy.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == TRANSFER_ENCODING
        || name == CONNECTION
        || name == KEEP_ALIVE
        || name == CONTENT_ENCODING
}

/// Rewrite the upstream response headers for the framed, same-origin leg.
pub fn rewrite_response_headers(headers: &HeaderMap, ctx: &RewriteContext) -> HeaderMap {
    let target_is_local = ctx.targets_local_host();
    let mut out = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers.iter() {
        if is_hop_by_hop(name) || name == X_FRAME_OPTIONS {
            continue;
        }

        if name == SET_COOKIE {
            let rewritten = value
                .to_str()
                .ok()
                .map(|cookie| rewrite_set_cookie(cookie, target_is_local))
                .and_then(|cookie| HeaderValue::from_str(&cookie).ok());
            out.append(SET_COOKIE, rewritten.unwrap_or_else(|| value.clone()));
            continue;
        }

        if name == CONTENT_SECURITY_POLICY {
            let Ok(policy) = value.to_str() else {
                out.append(CONTENT_SECURITY_POLICY, value.clone());
                continue;
            };
            if let Some(policy) = strip_frame_ancestors(policy) {
                match HeaderValue::from_str(&policy) {
                    Ok(v) => out.append(CONTENT_SECURITY_POLICY, v),
                    Err(_) => out.append(CONTENT_SECURITY_POLICY, value.clone()),
                };
            }
            continue;
        }

        out.append(name.clone(), value.clone());
    }

    out
}

/// Make a `Set-Cookie` value usable under the proxy origin.
///
/// The `Domain` attribute is removed (host-only cookie), `SameSite` is forced
/// to `Lax`, and `Secure` is dropped when the cookie belongs to a loopback
/// host, since the proxy commonly serves plain HTTP in that setup.
pub fn rewrite_set_cookie(cookie: &str, target_is_local: bool) -> String {
    let mut domain_is_local = false;
    let cookie = DOMAIN_ATTR.replace_all(cookie, |caps: &Captures| {
        let domain = caps["domain"].trim().trim_start_matches('.');
        domain_is_local |= is_local_host(domain);
        ""
    });

    let mut same_site_set = false;
    let cookie = SAMESITE_ATTR.replace_all(&cookie, |_: &Captures| {
        if same_site_set {
            ""
        } else {
            same_site_set = true;
            SAMESITE_LAX
        }
    });

    let mut cookie = if target_is_local || domain_is_local {
        SECURE_ATTR.replace_all(&cookie, "").into_owned()
    } else {
        cookie.into_owned()
    };

    if !same_site_set {
        let trimmed_len = cookie.trim_end().trim_end_matches(';').trim_end().len();
        cookie.truncate(trimmed_len);
        cookie.push_str(SAMESITE_LAX);
    }
    cookie
}

/// Remove every `frame-ancestors` directive from a CSP value.
///
/// Returns `None` when no directive is left, in which case the header should
/// be dropped altogether.
pub fn strip_frame_ancestors(policy: &str) -> Option<String> {
    let is_frame_ancestors = |directive: &str| {
        directive
            .split_ascii_whitespace()
            .next()
            .is_some_and(|name| name.eq_ignore_ascii_case("frame-ancestors"))
    };

    if !policy.split(';').any(is_frame_ancestors) {
        return Some(policy.to_string());
    }

    let kept: Vec<&str> = policy.split(';').filter(|d| !is_frame_ancestors(d)).collect();
    let joined = kept.join(";");
    let joined = joined.trim();
    if joined.trim_matches(|c: char| c == ';' || c.is_ascii_whitespace()).is_empty() {
        None
    } else {
        Some(joined.to_string())
    }
}
