//! Configuration types for the framegate proxy.
//!
//! Every field has a default, so the YAML file is optional and may be
//! partial. Command-line flags are merged on top in the binary.

mod cors;
mod listen;
mod upstream;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::target::validate_target_url;

pub use cors::CorsConfig;
pub use listen::ListenConfig;
pub use upstream::ConnectionPoolConfig;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,

    /// Where the proxy target is persisted between restarts
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Target used when no persisted value exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_target: Option<String>,

    #[serde(default)]
    pub connection_pool: ConnectionPoolConfig,

    /// Accept invalid/self-signed upstream certificates
    #[serde(default = "default_tls_skip_verify")]
    pub tls_skip_verify: bool,

    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".proxy_config.json")
}

fn default_tls_skip_verify() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            state_file: default_state_file(),
            initial_target: None,
            connection_pool: ConnectionPoolConfig::default(),
            tls_skip_verify: default_tls_skip_verify(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, anyhow::Error> {
        // An empty document deserializes to null; treat it as all defaults.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.listen.port == 0 {
            anyhow::bail!("listen.port must be between 1 and 65535");
        }

        self.listen_addr()?;

        if let Some(ref target) = self.initial_target {
            let target = target.trim();
            if !target.is_empty() {
                validate_target_url(target).context("initial_target")?;
            }
        }

        Ok(())
    }

    /// Socket address the proxy binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        let host = self.listen.host.trim_start_matches('[').trim_end_matches(']');
        let ip: std::net::IpAddr = host
            .parse()
            .with_context(|| format!("listen.host '{}' is not an IP address", self.listen.host))?;
        Ok(SocketAddr::new(ip, self.listen.port))
    }
}
