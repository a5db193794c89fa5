//! World state, world clock, tick scheduler, and perception builder for
//! the Oakhaven colony simulation.
//!
//! This crate owns everything that operates on the *whole* world rather
//! than a single resident: the authoritative resident/foraging-node
//! table, the world clock and its timers, the three-phase tick scheduler
//! that drives the simulation forward (§4.11, §4.12), and the perception
//! builder that turns world state into the packets delivered to
//! connected clients. Per-resident subsystem logic (needs, economy, law
//! enforcement, conversation, and so on) lives in `oakhaven-agents`; this
//! crate calls into it and is responsible for translating its outcomes
//! into [`oakhaven_events::Event`] records and webhook deliveries.
//!
//! # Modules
//!
//! - [`clock`] -- World clock: world-time counter and the train/restock/
//!   save timers.
//! - [`config`] -- Deployment and simulation-balance configuration.
//! - [`world`] -- The authoritative in-memory resident/foraging-node table.
//! - [`perception`] -- Per-resident perception assembly and the
//!   unfiltered spectator view.
//! - [`tick`] -- The position/simulation/perception tick scheduler.

pub mod clock;
pub mod config;
pub mod perception;
pub mod tick;
pub mod world;

pub use tick::{Simulation, TickError};
