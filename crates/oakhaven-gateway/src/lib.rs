//! Connection gateway for the Oakhaven colony engine.
//!
//! This crate provides an Axum HTTP + `WebSocket` server that exposes:
//!
//! - **A single `WebSocket` endpoint** (`/ws`) serving both player
//!   connections (`?token=...`, resident-bound and authenticated) and
//!   spectator connections (`?spectate=<resident-id>`, read-only and
//!   unauthenticated)
//! - **An internal HTTP companion contract** for the out-of-scope
//!   external registration/feedback surface to forward into the running
//!   simulation (`/internal/registration`, `/internal/feedback/:token`)
//! - **A minimal HTML status page** (`GET /`) showing world time and
//!   resident count
//!
//! # Architecture
//!
//! The live simulation is owned exclusively by the tick scheduler
//! (`oakhaven-engine`); this gateway never touches it directly. Instead
//! it holds three channels to that owner: a read-only
//! [`state::GatewaySnapshot`] refreshed once per tick for bind-time
//! checks, an `mpsc` [`state::GatewayCommand`] channel the scheduler
//! drains once per tick, and a `broadcast` channel of addressed
//! [`state::OutboundEnvelope`]s the scheduler publishes to.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::GatewayError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::{spawn_gateway, StartupError};
pub use state::{GatewayCommand, GatewaySnapshot, GatewayState, OutboundEnvelope, Recipient, ResidentSnapshot};
