//! Tile map, pathfinding, collision, and foraging for the Oakhaven
//! colony simulation.
//!
//! This crate models the physical world: a dense 2D tile grid with
//! obstacles, building placements, and foraging nodes, plus the pure
//! spatial queries (line of sight, wall counting), A* pathfinding, and
//! wall-sliding collision resolution built on top of it.
//!
//! # Modules
//!
//! - [`error`] -- Error types for map, pathfinding, and structure
//!   operations.
//! - [`tile_map`] -- The immutable map artifact and its pure queries:
//!   [`tile_map::TileMap::is_blocked`],
//!   [`tile_map::TileMap::is_position_blocked`],
//!   [`tile_map::TileMap::has_line_of_sight`],
//!   [`tile_map::TileMap::count_walls_between`].
//! - [`pathfinder`] -- A* over the walkable-tile graph.
//! - [`collision`] -- Full-move / x-slide / y-slide collision resolution.
//! - [`resource`] -- Foraging node depletion and regrowth.

pub mod collision;
pub mod error;
pub mod pathfinder;
pub mod resource;
pub mod tile_map;

pub use collision::{resolve_move, MoveOutcome};
pub use error::WorldError;
pub use pathfinder::find_path;
pub use resource::{harvest, tick_regrowth};
pub use tile_map::{BuildingPlacement, DoorTile, ForageNodePlacement, InteractionZone, TileMap};
