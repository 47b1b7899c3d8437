use std::{net::SocketAddr, sync::Arc, time::Duration};

use tracing::info;
use utopian_radio::{
    common::{AnyResult, logger},
    configs::Config,
    room::ticker,
    server::AppState,
    transport,
};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(config.logging.as_ref());

    match &config.source {
        Some(path) => info!("Loaded configuration from: {}", path),
        None => info!("No config.toml found, using built-in defaults"),
    }

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let tick_period = Duration::from_millis(config.room.tick_interval_ms);

    let state = Arc::new(AppState::new(config));
    let ticker = ticker::spawn(state.registry.clone(), state.gateway.clone(), tick_period);

    let app = transport::http_server::router(state);

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Utopian Radio listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    ticker.abort();
    Ok(())
}
