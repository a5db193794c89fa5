//! Fire-and-forget HTTP webhook dispatch, off the tick hot path.
//!
//! A resident may register an opt-in webhook URL; on significant events
//! (collapse, arrest, health-critical, speech heard, reflections) the
//! dispatcher POSTs a JSON payload to that URL with a 5 second timeout. A
//! failed delivery is logged and dropped -- it never blocks or panics the
//! tick scheduler.
//!
//! # Architecture
//!
//! - [`client`] -- [`client::WebhookClient`]: the `reqwest`-backed POST,
//!   spawned onto its own task so dispatch never blocks the caller.
//! - [`throttle`] -- [`throttle::Throttle`]: per-key rate limiting (e.g.
//!   health-critical at most once per 10 s, undirected speech at most once
//!   per second).
//! - [`payload`] -- the JSON envelope shapes posted to subscriber URLs.

pub mod client;
pub mod payload;
pub mod throttle;

pub use client::WebhookClient;
pub use payload::WebhookPayload;
pub use throttle::Throttle;
