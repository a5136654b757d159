mod config;
mod links;
mod platform;
mod relay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, TOKEN_ENV_VAR};
use crate::relay::LinkRelayHandler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vxrelay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!("[FATAL] {:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run() -> Result<()> {
    // An explicit path must exist; the default one is optional
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path, explicit.is_some())
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let token = config.bot_token(std::env::var(TOKEN_ENV_VAR).ok())?;

    info!("Configuration loaded successfully");
    info!("  Embed colour: {}", config.relay.embed_color);
    info!("  Apology on failure: {}", config.relay.apology);

    let relay = LinkRelayHandler::new(&config.relay);

    info!("Bot is starting...");
    platform::discord::run(&token, relay).await
}
