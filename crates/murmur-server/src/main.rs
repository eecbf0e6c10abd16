mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use murmur_core::{Bot, BotSettings};
use murmur_db::Database;
use murmur_gateway::dispatcher::Dispatcher;
use murmur_gateway::poller::Poller;
use murmur_gateway::telegram::TelegramClient;

use crate::config::BotConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "murmur_server=info,murmur_core=info,murmur_gateway=info,murmur_db=info".into()
            }),
        )
        .init();

    let config = BotConfig::from_env().context("invalid configuration")?;
    info!(
        channel = %config.channel,
        owner = %config.owner,
        database = %config.database_path.display(),
        "Starting murmur"
    );

    let db = Arc::new(
        Database::open(&config.database_path)
            .with_context(|| format!("failed to open {}", config.database_path.display()))?,
    );

    let client = TelegramClient::new(
        &config.api_url,
        &config.token,
        config.channel.clone(),
        config.request_timeout,
    )?;
    let me = client.get_me().await.context("bot token rejected")?;
    match &me.username {
        Some(username) => info!("Authenticated as @{}", username),
        None => warn!("Authenticated bot account has no username"),
    }

    let bot = Bot::new(
        db,
        Arc::new(client.clone()),
        BotSettings {
            owner: config.owner,
            channel: config.channel,
            creator_url: config.creator_url,
            developer_url: config.developer_url,
        },
    );
    let dispatcher = Dispatcher::new(Arc::new(bot));

    info!("Relay is inactive until an admin sends /on");
    Poller::new(client, dispatcher.clone(), config.poll_timeout_secs, me.username)
        .run(shutdown_signal())
        .await;

    // Updates up to the last offset are already acknowledged; finish them.
    dispatcher.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            },
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
