//! Error types for the `oakhaven-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use oakhaven_types::{ForageNodeId, StructureId};

/// Errors that can occur during tile map, pathfinding, or structure
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The map artifact failed to parse or violates a structural invariant.
    #[error("invalid map artifact: {0}")]
    InvalidMapArtifact(String),

    /// A pathfinding request originated from, or targeted, a blocked tile.
    #[error("path endpoint is blocked")]
    PathEndpointBlocked,

    /// No path exists between the requested source and destination.
    #[error("no path found")]
    NoPathFound,

    /// The referenced structure was not found on the map.
    #[error("structure not found: {0}")]
    StructureNotFound(StructureId),

    /// The referenced foraging node was not found on the map.
    #[error("foraging node not found: {0}")]
    ForageNodeNotFound(ForageNodeId),

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
