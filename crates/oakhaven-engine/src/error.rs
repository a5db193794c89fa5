//! Error types for the colony engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every subsystem
//! failure mode that can occur during boot or the tick loop.

/// Top-level error for the colony engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: oakhaven_core::config::ConfigError,
    },

    /// World clock initialization or restoration failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: oakhaven_core::clock::ClockError,
    },

    /// The tick scheduler failed to build or advance.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: oakhaven_core::tick::TickError,
    },

    /// A tile map or pathfinding operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: oakhaven_world::WorldError,
    },

    /// A persistence operation failed.
    #[error("database error: {source}")]
    Db {
        /// The underlying database error.
        #[from]
        source: oakhaven_db::DbError,
    },

    /// The gateway server failed to bind or run.
    #[error("gateway server error: {source}")]
    GatewayServer {
        /// The underlying gateway server error.
        #[from]
        source: oakhaven_gateway::ServerError,
    },

    /// The gateway failed to start on its background task.
    #[error("gateway startup error: {source}")]
    GatewayStartup {
        /// The underlying gateway startup error.
        #[from]
        source: oakhaven_gateway::StartupError,
    },

    /// The map artifact could not be loaded from disk.
    #[error("map artifact error: {message}")]
    MapArtifact {
        /// Description of what went wrong loading the map.
        message: String,
    },
}
