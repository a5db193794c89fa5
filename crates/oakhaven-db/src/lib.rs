//! Persistence layer for the Oakhaven colony simulation.
//!
//! The simulation keeps all state in memory during a run; this crate is
//! how that state survives a restart. A single embedded SQLite database
//! in WAL mode (§6) is the only store — there is no separate hot/cold
//! split, since a single colony's resident count and event volume never
//! approach a scale that needs one.
//!
//! # Modules
//!
//! - [`sqlite`] -- connection pool and configuration
//! - [`resident_store`] -- residents, inventory, and law/offense history
//! - [`event_store`] -- the append-only event log
//! - [`board_store`] -- the job board, petition board, and shop registry
//! - [`world_state_store`] -- the world clock's singleton row
//! - [`claims_store`] -- the out-of-scope identity/feedback surface
//! - [`tick_persist`] -- coordinates a full save/load across the above
//! - [`error`] -- shared error types

pub mod board_store;
pub mod claims_store;
pub mod error;
pub mod event_store;
pub mod resident_store;
pub mod sqlite;
pub mod tick_persist;
pub mod world_state_store;

pub use board_store::BoardStore;
pub use claims_store::{ClaimsStore, FeedbackRow};
pub use error::DbError;
pub use event_store::{EventRow, EventStore};
pub use resident_store::ResidentStore;
pub use sqlite::{SqliteConfig, SqlitePool};
pub use tick_persist::{ColonySave, PersistenceCoordinator};
pub use world_state_store::{WorldStateRow, WorldStateStore};
