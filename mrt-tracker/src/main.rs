use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mrt_tracker::board::{LAMPS, WiringTable};
use mrt_tracker::config::AppConfig;
use mrt_tracker::network::Network;
use mrt_tracker::smrt::SmrtClient;
use mrt_tracker::tracker::Tracker;
use mrt_tracker::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let network = Network::singapore()?;
    let wiring = WiringTable::dev_v1()?;
    wiring.validate(LAMPS)?;
    let board_format = wiring.name().to_string();

    let client = SmrtClient::new(config.smrt.clone())?;
    let mut tracker = Tracker::new(config.tracker.clone(), network, wiring, Arc::new(client))?;
    tracker.start();

    let state = AppState::new(tracker.cache(), &board_format, &config.version);
    let app = create_router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "MRT tracker listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tracker.stop().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
