//! Bug Hunt Game Server
//!
//! Serves the bug hunt game over WebSocket. Configuration comes from
//! `BUG_HUNT_*` environment variables; log level from `RUST_LOG`.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bug_hunt::{
    VERSION,
    network::{GameServer, ServerConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    info!("Bug Hunt Server v{}", VERSION);
    info!("Scan poll interval: {:?}", config.scan_poll_interval);
    info!(
        "Scan speeds: easy {}s, medium {}s, hard {}s",
        config.game.easy_speed, config.game.medium_speed, config.game.hard_speed
    );

    let server = std::sync::Arc::new(GameServer::new(config)?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            signal_server.shutdown();
        }
    });

    server.run().await?;
    info!("Server stopped");

    Ok(())
}
