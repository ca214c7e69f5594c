mod commands;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aichat::config::ChatConfig;
use aichat::state::Session;
use commands::{Flow, Host};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ChatConfig::from_env().context("Invalid configuration")?;
    if config.api_key.is_none() {
        warn!("No API key configured; set AICHAT_API_KEY if the endpoint requires one");
    }

    let session = Session::from_config(&config)?;
    info!(
        model = %config.model,
        endpoint = %config.endpoint,
        window = config.policy.history_window,
        "Chat session initialized"
    );

    println!("Welcome to AIChat. Type a message, or /help for commands.");
    let mut host = Host::new(config, session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Flow::Quit = host.handle(&line).await {
            break;
        }
    }

    info!("Goodbye");
    Ok(())
}
