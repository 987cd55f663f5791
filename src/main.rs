use std::{net::SocketAddr, sync::Arc};

use pin_board::{
    AppState, build_router,
    config::Config,
    error::Result,
    utils::server::{init_tracing, shutdown_signal},
    ws::BoardRoom,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    config.validate()?;
    tracing::info!("Configuration loaded");

    let room = BoardRoom::new(config.board.clone());
    tracing::info!(
        max_clients = config.board.max_clients,
        quorum_ratio = config.board.quorum_ratio,
        "Board room initialized"
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        room: Arc::new(room),
    };

    let app = build_router(state);

    let server_addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    tracing::info!("Server shutdown complete");

    Ok(())
}
