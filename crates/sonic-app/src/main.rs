//! sonic - catalog synchronizer and secret cache entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Catalog synchronizer and secret cache
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SONIC_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    sonic_telemetry::init_logging()?;

    info!("Starting sonic v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > SONIC_CONFIG env var > default
    let config = match args
        .config
        .or_else(|| std::env::var(sonic_app::config::CONFIG_ENV).ok())
    {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            sonic_app::AppConfig::from_file(&path)?
        }
        None => sonic_app::AppConfig::load()?,
    };
    info!(
        opendax = %config.opendax.addr,
        peatio = %config.mngapi.peatio_url,
        vault = %config.vault.addr,
        sync_enabled = config.sync.enabled,
        markets_only = config.sync.markets_only,
        "Configuration loaded"
    );

    let app = sonic_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
