//! Agent-side subsystem logic for Oakhaven residents.
//!
//! This crate contains the simulation logic that operates on a single
//! resident's state (and, for a handful of actions, one named target)
//! without touching I/O, the tile map's full geometry, or the wider
//! resident table. It sits between `oakhaven-types` (the wire/data model)
//! and `oakhaven-core` (which owns the tick loop, the resident table, and
//! event/webhook emission).
//!
//! # Modules
//!
//! - [`actions`] -- Action precondition pipeline, costs, and dispatch.
//! - [`config`] -- Tunables for needs, economy, law enforcement, and conversation.
//! - [`conversation`] -- Speech queuing and turn-taking (§4.8).
//! - [`death`] -- Death transition and corpse carrying (§4.4, §4.5).
//! - [`economy`] -- Shop purchases, UBI, and consumption (§4.6).
//! - [`employment`] -- Job application, shifts, and wages (§4.6).
//! - [`error`] -- [`AgentError`], the shared fallible-action error type.
//! - [`inventory`] -- Inventory slot mutation helpers.
//! - [`jobs`] -- The colony job board.
//! - [`law_enforcement`] -- Loitering, arrest, and booking (§4.7).
//! - [`needs`] -- Per-tick needs decay/recovery (§4.4).
//! - [`pain`] -- Pain/reflection signal generation (§4.9).
//! - [`petitions`] -- The council petition board.
//! - [`reflection`] -- Milestone/periodic reflection and feedback tokens (§4.9).
//! - [`shop`] -- The colony shop's price/stock table.

pub mod actions;
pub mod config;
pub mod conversation;
pub mod death;
pub mod economy;
pub mod employment;
pub mod error;
pub mod inventory;
pub mod jobs;
pub mod law_enforcement;
pub mod needs;
pub mod pain;
pub mod petitions;
pub mod reflection;
pub mod shop;

pub use actions::{dispatch, ActionContext};
pub use error::AgentError;
