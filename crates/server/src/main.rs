use std::sync::Arc;

use clap::Parser;
use life_server::config::{Cli, ServerConfig};
use life_server::metrics::Metrics;
use life_server::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::try_from(Cli::parse())?;

    tracing::info!("Game of Life session server");
    tracing::info!(
        "Tick every {:?}, push every {:?}, idle ttl {:?}",
        config.sessions.tick_period,
        config.sessions.push_period,
        config.sessions.idle_ttl,
    );

    let metrics = Arc::new(Metrics::new());
    let store = Arc::new(SessionStore::new(config.sessions.clone(), metrics));

    // Idle-session expiry (only when a TTL is configured).
    let reaper = store.spawn_reaper();

    // ── Serve until the listener fails or Ctrl+C ─────────────────────────
    tokio::select! {
        result = life_server::net::listener::run(Arc::clone(&store), config.listen_addr) => {
            if let Err(e) = result {
                tracing::error!("Server error: {:#}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, shutting down...");
        }
    }

    if let Some(reaper) = reaper {
        reaper.abort();
    }
    let closed = store.close_all();
    tracing::info!("Shutdown complete: {} sessions closed", closed);
    Ok(())
}
