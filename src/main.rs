//! Gift Dice Server
//!
//! Starts both ingress surfaces over one shared round engine:
//! the HTTP API for the browser miniapp and, when a bot token is configured,
//! the long-polling chat bot.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gift_dice::game::RoundEngine;
use gift_dice::network::{create_router, Bot, TelegramApi};
use gift_dice::storage::SnapshotWriter;
use gift_dice::VERSION;

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
struct ServerConfig {
    /// HTTP bind address (`BIND_ADDR`).
    bind_addr: SocketAddr,
    /// Telegram bot token (`BOT_TOKEN`); chat surface disabled when unset.
    bot_token: Option<String>,
    /// Miniapp URL for keyboard buttons (`WEBAPP_URL`).
    webapp_url: Option<String>,
    /// Long-poll timeout in seconds (`POLL_TIMEOUT`).
    poll_timeout_secs: u64,
    /// Crash-recovery snapshot path (`SNAPSHOT_PATH`).
    snapshot_path: PathBuf,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env_or("BIND_ADDR", "127.0.0.1:8081")
            .parse()
            .context("invalid BIND_ADDR")?;
        let poll_timeout_secs = env_or("POLL_TIMEOUT", "25")
            .parse()
            .context("invalid POLL_TIMEOUT")?;
        Ok(Self {
            bind_addr,
            bot_token: env_opt("BOT_TOKEN"),
            webapp_url: env_opt("WEBAPP_URL"),
            poll_timeout_secs,
            snapshot_path: PathBuf::from(env_or("SNAPSHOT_PATH", "gift_dice_state.json")),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env()?;
    info!("Gift Dice Server v{VERSION}");
    info!(snapshot = %config.snapshot_path.display(), "snapshot writer starting");

    let writer = SnapshotWriter::spawn(config.snapshot_path.clone());
    let engine = Arc::new(RoundEngine::new().with_snapshot_channel(writer.sender()));

    match &config.bot_token {
        Some(token) => {
            let bot = Bot::new(
                TelegramApi::new(token),
                engine.clone(),
                config.webapp_url.clone(),
                config.poll_timeout_secs,
            );
            tokio::spawn(bot.run());
            info!("chat surface enabled");
        }
        None => info!("BOT_TOKEN not set; chat surface disabled"),
    }

    let app = create_router(engine);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("HTTP API listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
