use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use latticesync_node::{app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    latticesync_core::logging::init();

    let config = Config::from_env();
    let port = config.port;
    let state = Arc::new(AppState::new(config)?);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("LatticeSync node listening on {}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
