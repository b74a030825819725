//! newsroomd binary entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use newsroom_core::telemetry::{init_tracing, level_for_verbosity};
use newsroom_core::NewsroomConfig;
use newsroomd::NewsroomServer;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "newsroomd")]
#[command(about = "Newsroom HTTP service", long_about = None)]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "NEWSROOM_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.json, level_for_verbosity(args.verbose));

    let mut config =
        NewsroomConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    if config.reasoning.api_key.is_none() {
        warn!("NEWSROOM_REASONING_API_KEY (or OPENAI_API_KEY) is not set; reasoning calls will fail");
    }
    info!(
        version = newsroom_core::VERSION,
        model = %config.reasoning.model,
        retrieval = config.retrieval.enabled,
        "Starting newsroomd"
    );

    let server = NewsroomServer::new(config).context("failed to initialise server")?;
    info!("Endpoints: GET /, GET /agent/health, POST /generate-news, POST /agent/query, POST /agent/suggestions");
    server.start().await.context("server terminated with an error")?;

    Ok(())
}
