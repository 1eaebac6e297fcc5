//! HTTP client creation and configuration.
//!
//! One pooled client is shared by every proxied request.

use super::forwarding::{MAX_REDIRECTS, UPSTREAM_TIMEOUT};
use crate::config::Config;
use anyhow::Context;
use std::time::Duration;
use tracing::{info, warn};

/// Create the shared upstream client.
///
/// Responses are transparently decompressed so the rewriters always see
/// decoded bodies.
pub fn create_http_client(config: &Config) -> Result<reqwest::Client, anyhow::Error> {
    let pool = &config.connection_pool;

    if config.tls_skip_verify {
        warn!("TLS certificate verification DISABLED for upstream targets (development use)");
    }

    let client = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .connect_timeout(Duration::from_secs(pool.connect_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(pool.idle_timeout_secs))
        .pool_max_idle_per_host(pool.max_idle_per_host)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(config.tls_skip_verify)
        .build()
        .context("Failed to build upstream HTTP client")?;

    info!(
        "Connection pool configured: max_idle={}, idle_timeout={}s, connect_timeout={}s",
        pool.max_idle_per_host, pool.idle_timeout_secs, pool.connect_timeout_secs
    );

    Ok(client)
}
