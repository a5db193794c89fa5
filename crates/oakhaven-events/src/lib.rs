//! Append-only event log for the Oakhaven colony simulation.
//!
//! Every observable action produces an immutable [`Event`], appended to
//! the in-memory log by the action arbiter and persisted by the
//! persistence layer. The log is the source of truth for activity feeds,
//! analytics, and reputation — it is never mutated or pruned, only
//! appended to and queried.
//!
//! # Architecture
//!
//! Mirrors the append-only, monotonic-id design of `oakhaven_ledger::Ledger`:
//! a single in-memory [`EventLog`] holds every [`Event`] in insertion
//! order, with `record_*` convenience constructors per [`EventType`] and
//! query methods for the gateway's activity-feed and analytics contracts.

pub mod builder;
pub mod log;

pub use builder::EventBuilder;
pub use log::EventLog;
