//! Axum router construction for the connection gateway.
//!
//! Assembles the `WebSocket` upgrade route, the internal HTTP companion
//! contract, and the status page into a single [`Router`] with CORS
//! middleware enabled for cross-origin client access.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::GatewayState;
use crate::ws;

/// Build the complete Axum router for the gateway server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- player (`?token=`) or spectator (`?spectate=`) `WebSocket` upgrade
/// - `POST /internal/registration` -- queue a registered resident for the next train
/// - `POST /internal/feedback/:token` -- redeem a reflection feedback token
///
/// CORS is configured to allow any origin; the client is a separate
/// deployable artifact and the gateway has no session cookies to leak.
#[must_use]
pub fn build_router(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws", get(ws::ws_upgrade))
        .route("/internal/registration", post(handlers::register_resident))
        .route("/internal/feedback/{token}", post(handlers::redeem_feedback))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
