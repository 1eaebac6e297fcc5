//! Upstream connection pool configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectionPoolConfig {
    /// Maximum idle connections kept per upstream host
    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_idle_per_host() -> usize {
    32
}

fn default_idle_timeout_secs() -> u64 {
    90
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: default_max_idle_per_host(),
            idle_timeout_secs: default_idle_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}
