use anyhow::Context;
use campus_core::CampusConfig;
use campus_server::{AppState, CampusServer, telemetry};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "campus-server", version, about = "Campus API server")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, env = "CAMPUS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = CampusConfig::load(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration".to_string(),
    })?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    telemetry::init(&config.logging)?;

    let state = AppState::from_config(config)?;
    CampusServer::new(state).run().await?;
    Ok(())
}
