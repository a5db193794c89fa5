//! Gateway startup helper for embedding in the colony engine binary.
//!
//! Provides [`spawn_gateway`] which launches the gateway's HTTP +
//! `WebSocket` server on a background Tokio task. The engine binary
//! calls this during startup so the gateway runs concurrently with the
//! tick loop.
//!
//! # Usage
//!
//! ```rust,ignore
//! use oakhaven_gateway::startup::spawn_gateway;
//! use oakhaven_gateway::state::GatewayState;
//!
//! let (state, commands) = GatewayState::with_channel(secret, map_url);
//! let handle = spawn_gateway(8080, Arc::new(state)).await?;
//! // The server is now running. The handle can be awaited on shutdown.
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::GatewayState;

/// Errors that can occur when spawning the gateway server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the gateway HTTP server on a background Tokio task.
///
/// Binds to `0.0.0.0:{port}` and serves the `WebSocket` endpoint plus
/// internal HTTP companion contract. Returns a [`JoinHandle`] so the
/// caller can manage the server's lifecycle alongside the simulation
/// loop.
///
/// The server runs until the Tokio runtime is shut down or the task is
/// aborted. The caller should hold the returned handle and abort or
/// await it during clean shutdown.
///
/// # Arguments
///
/// * `port` -- TCP port to listen on.
/// * `state` -- Shared gateway state containing the broadcast channel,
///   command channel, and world snapshot. The scheduler updates this
///   state each tick; the gateway serves it read-only.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// requested address. This is detected eagerly before the background
/// task is spawned by performing an address-parse check.
pub async fn spawn_gateway(port: u16, state: Arc<GatewayState>) -> Result<JoinHandle<()>, StartupError> {
    let config = ServerConfig { host: String::from("0.0.0.0"), port };

    let addr_str = format!("{}:{}", config.host, config.port);
    let _: std::net::SocketAddr =
        addr_str.parse().map_err(|e| StartupError::Server(ServerError::Bind(format!("invalid address {addr_str}: {e}"))))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "gateway server exited with error");
        }
    });

    tracing::info!(port, "gateway server spawned on background task");

    Ok(handle)
}
