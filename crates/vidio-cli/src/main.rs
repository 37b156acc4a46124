//! `vidio` binary: the composition root.
//!
//! Loads `.env`, parses configuration, installs logging and runs the HTTP
//! server until Ctrl+C.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vidio_axum::{ServerConfig, start_server};
use vidio_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load before parsing so .env values reach clap's env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(port = cli.port, verbose = cli.verbose, "Parsed configuration");

    start_server(ServerConfig::new(cli.settings())).await
}
