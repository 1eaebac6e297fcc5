//! Proxy server module.
//!
//! # Module Structure
//!
//! - `server` - ProxyServer struct and main run loop
//! - `dispatcher` - per-request pipeline for the mount path
//! - `forwarding` - upstream request construction and execution
//! - `headers` - request header filtering and response header rewriting
//! - `client` - pooled HTTP client creation
//! - `network` - listener construction

mod client;
mod dispatcher;
mod forwarding;
mod headers;
mod network;
mod server;

pub use client::create_http_client;
pub use dispatcher::{mount_sub_path, rewrite_upstream_response, InboundRequest, ProxyDispatcher};
pub use forwarding::{
    build_upstream_url, method_carries_body, ForwardError, ForwardRequest, Forwarder,
    UpstreamResponse, MAX_REDIRECTS, UPSTREAM_TIMEOUT,
};
pub use headers::{
    filter_request_headers, rewrite_response_headers, rewrite_set_cookie, strip_frame_ancestors,
};
pub use network::create_listener;
pub use server::ProxyServer;
