//! sketch-server: HTTP front end for the character canvas service.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sketch::config::SketchConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Character canvas HTTP server
#[derive(Parser)]
#[command(name = "sketch-server")]
#[command(about = "Serve character canvases over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "SKETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut config = SketchConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.http.port = port;
    }

    sketch_server::serve(config).await
}

/// Initialize logging
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
