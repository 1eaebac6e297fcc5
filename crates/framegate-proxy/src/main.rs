use anyhow::Context;
use clap::Parser;
use framegate_proxy::target::{JsonFilePersistence, NoOpPersistence, TargetPersistence};
use framegate_proxy::{Config, ProxyServer, TargetStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Same-origin embedding proxy
#[derive(Parser, Debug)]
#[command(name = "framegate", author, version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "FRAMEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides listen.port)
    #[arg(short, long, env = "FRAMEGATE_PORT")]
    port: Option<u16>,

    /// Listen address (overrides listen.host)
    #[arg(long, env = "FRAMEGATE_HOST")]
    host: Option<String>,

    /// File holding the persisted target (overrides state_file)
    #[arg(long, env = "FRAMEGATE_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Target used when nothing is persisted (overrides initial_target)
    #[arg(short, long, env = "FRAMEGATE_TARGET")]
    target: Option<String>,

    /// Keep the target in memory only
    #[arg(long)]
    ephemeral: bool,
}

impl Args {
    fn into_config(self) -> Result<(Config, bool), anyhow::Error> {
        let mut config = match self.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if let Some(host) = self.host {
            config.listen.host = host;
        }
        if let Some(state_file) = self.state_file {
            config.state_file = state_file;
        }
        if let Some(target) = self.target {
            config.initial_target = Some(target);
        }

        config.validate().context("Invalid configuration")?;
        Ok((config, self.ephemeral))
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (config, ephemeral) = Args::parse().into_config()?;

    let persistence: Arc<dyn TargetPersistence> = if ephemeral {
        info!("Ephemeral mode: proxy target will not be persisted");
        Arc::new(NoOpPersistence)
    } else {
        info!("Persisting proxy target to {}", config.state_file.display());
        Arc::new(JsonFilePersistence::new(&config.state_file))
    };

    let targets = Arc::new(TargetStore::load(persistence, config.initial_target.as_deref()));

    ProxyServer::new(config, targets)?.run().await
}
