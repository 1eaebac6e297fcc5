//! Framegate: a same-origin embedding proxy.
//!
//! Serves one upstream web app under `/app` and rewrites its responses
//! (URLs, module imports, cookies, frame-blocking headers) so the app can run
//! inside an iframe of a host page on the proxy's origin. An injected script
//! lets the host page pick elements in the embedded app.

pub mod admin_api;
pub mod config;
pub mod metrics;
pub mod proxy;
pub mod response;
pub mod rewrite;
pub mod target;

pub use config::Config;
pub use proxy::ProxyServer;
pub use target::TargetStore;
