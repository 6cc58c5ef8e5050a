use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::session::SessionStore;

/// Bind `addr` and serve the API until the listener fails.
pub async fn run(store: Arc<SessionStore>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(store, listener).await
}

/// Serve the API on an already-bound listener.
pub async fn serve(store: Arc<SessionStore>, listener: TcpListener) -> anyhow::Result<()> {
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, super::router(store)).await?;
    Ok(())
}
