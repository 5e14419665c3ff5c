use anyhow::Context;
use clap::Parser;
use dynamo_api::setup::{shutdown_signal, Server};
use dynamo_core::Settings;
use dynamo_infra::{init_telemetry, LogSettings};
use std::path::PathBuf;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "dynamo-api")]
#[command(about = "Media upload service", long_about = None)]
struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(long, env = "DYNAMO_CONFIG", default_value = "config/default.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    init_telemetry(&LogSettings::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let drain_timeout = settings.drain_timeout();
    tracing::info!(
        config = %cli.config.display(),
        "Configuration loaded and validated successfully"
    );

    let server = Server::start(settings).await?;

    shutdown_signal().await;

    server.stop(drain_timeout).await
}
