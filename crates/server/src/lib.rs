//! # sqlrag HTTP server
//!
//! Answers `POST /query` with SQL generated from the indexed schema and serves
//! `GET /health` for liveness checks.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

use crate::{
    config::{get_config, AppConfig},
    router::create_router,
    state::build_app_state,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Serves the query API on an already bound listener until the server stops.
///
/// Opens the vector index and loads the system prompt before accepting connections,
/// so a missing prompt file fails here instead of on the first request.
pub async fn serve(listener: TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Server configuration loaded");

    let app_state = build_app_state(config).await?;
    let app = create_router(app_state);

    info!(addr = %listener.local_addr()?, "Accepting query requests");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Process entry point for the `server` binary.
///
/// Reads `.env`, logs through `RUST_LOG` (`info` when unset) and binds every
/// interface on the configured port.
pub async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = get_config(None)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    serve(listener, config).await
}
