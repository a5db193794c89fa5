//! The immutable tile map artifact and its pure spatial queries.
//!
//! The map is produced once by an external map generator, loaded at boot
//! from a JSON file, and never mutated over the lifetime of the server.
//! Every query here is a pure function of `&TileMap` plus its arguments --
//! no query allocates mutable state or touches anything outside the map.

use serde::{Deserialize, Serialize};

use oakhaven_types::{Position, StructureId, StructureKind};

/// A door tile with the cardinal direction a resident must approach from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorTile {
    /// Tile-space x coordinate.
    pub tx: i32,
    /// Tile-space y coordinate.
    pub ty: i32,
    /// Facing degrees a resident must hold to pass through (0, 90, 180, 270).
    pub facing_degrees: u16,
}

/// A rectangular interaction zone, in pixel space, associated with a
/// building (e.g. the counter area of a shop).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionZone {
    /// Top-left x in pixels.
    pub x: f64,
    /// Top-left y in pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl InteractionZone {
    /// Whether the given position falls inside this zone.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.x
            && position.x <= self.x + self.width
            && position.y >= self.y
            && position.y <= self.y + self.height
    }
}

/// A placed building on the map: its interior footprint, doors, and
/// interaction zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingPlacement {
    /// The building's persistent id.
    pub id: StructureId,
    /// What kind of building this is.
    pub kind: StructureKind,
    /// Reference point (door tile center, in pixels) used for perception
    /// distance and `enter_building` range checks.
    pub position: Position,
    /// Tile-space bounding box of the interior footprint, `(min_tx, min_ty,
    /// max_tx, max_ty)` inclusive.
    pub interior: (i32, i32, i32, i32),
    /// Door tiles granting entry/exit.
    pub doors: Vec<DoorTile>,
    /// Interaction zones associated with this building.
    pub interaction_zones: Vec<InteractionZone>,
}

impl BuildingPlacement {
    /// Whether the given tile coordinate falls within this building's
    /// interior footprint.
    #[must_use]
    pub fn contains_tile(&self, tx: i32, ty: i32) -> bool {
        let (min_tx, min_ty, max_tx, max_ty) = self.interior;
        tx >= min_tx && tx <= max_tx && ty >= min_ty && ty <= max_ty
    }
}

/// A foragable node placement baked into the map artifact (distinct from
/// the live, mutable [`oakhaven_types::ForagingNode`] runtime state, which
/// tracks uses-remaining).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForageNodePlacement {
    /// Position in pixels.
    pub position: Position,
}

/// The immutable tile map artifact: ground/obstacle layers, building
/// placements, foragable node positions, and the spawn point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMap {
    /// Width of the map, in tiles.
    pub width: u32,
    /// Height of the map, in tiles.
    pub height: u32,
    /// Tile edge length, in pixels.
    pub tile_size: f64,
    /// Row-major obstacle layer; `true` means the tile is impassable.
    obstacles: Vec<bool>,
    /// Buildings placed on the map.
    pub buildings: Vec<BuildingPlacement>,
    /// Foragable node spawn positions.
    pub forage_nodes: Vec<ForageNodePlacement>,
    /// The resident spawn point, in pixels.
    pub spawn_point: Position,
}

impl TileMap {
    /// Build a new map artifact from its layers.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::WorldError::InvalidMapArtifact`] if the
    /// obstacle layer's length does not equal `width * height`.
    pub fn new(
        width: u32,
        height: u32,
        tile_size: f64,
        obstacles: Vec<bool>,
        buildings: Vec<BuildingPlacement>,
        forage_nodes: Vec<ForageNodePlacement>,
        spawn_point: Position,
    ) -> Result<Self, crate::error::WorldError> {
        let expected = usize::try_from(width)
            .unwrap_or(usize::MAX)
            .saturating_mul(usize::try_from(height).unwrap_or(usize::MAX));
        if obstacles.len() != expected {
            return Err(crate::error::WorldError::InvalidMapArtifact(format!(
                "obstacle layer has {} tiles, expected {expected}",
                obstacles.len()
            )));
        }
        Ok(Self {
            width,
            height,
            tile_size,
            obstacles,
            buildings,
            forage_nodes,
            spawn_point,
        })
    }

    fn tile_index(&self, tx: i32, ty: i32) -> Option<usize> {
        if tx < 0 || ty < 0 {
            return None;
        }
        let (tx, ty) = (u32::try_from(tx).ok()?, u32::try_from(ty).ok()?);
        if tx >= self.width || ty >= self.height {
            return None;
        }
        let index = usize::try_from(ty).ok()?.checked_mul(usize::try_from(self.width).ok()?)?;
        index.checked_add(usize::try_from(tx).ok()?)
    }

    /// Convert a pixel coordinate to its containing tile coordinate.
    #[must_use]
    pub fn pixel_to_tile(&self, x: f64, y: f64) -> (i32, i32) {
        let tx = (x / self.tile_size).floor();
        let ty = (y / self.tile_size).floor();
        // Safety: map dimensions fit comfortably in i32; values far outside
        // that range are already nonsensical tile coordinates.
        #[allow(clippy::cast_possible_truncation)]
        let result = (tx as i32, ty as i32);
        result
    }

    /// Whether the given tile is impassable. Out-of-bounds tiles are
    /// always treated as blocked.
    #[must_use]
    pub fn is_blocked(&self, tx: i32, ty: i32) -> bool {
        match self.tile_index(tx, ty) {
            Some(index) => self.obstacles.get(index).copied().unwrap_or(true),
            None => true,
        }
    }

    /// Whether a square hitbox centered at `(px, py)` with half-width
    /// `half_hitbox` overlaps any blocked tile.
    #[must_use]
    pub fn is_position_blocked(&self, px: f64, py: f64, half_hitbox: f64) -> bool {
        let corners = [
            (px - half_hitbox, py - half_hitbox),
            (px + half_hitbox, py - half_hitbox),
            (px - half_hitbox, py + half_hitbox),
            (px + half_hitbox, py + half_hitbox),
        ];
        corners.iter().any(|&(x, y)| {
            let (tx, ty) = self.pixel_to_tile(x, y);
            self.is_blocked(tx, ty)
        })
    }

    /// Step a ray from `(x1, y1)` to `(x2, y2)` in half-tile increments,
    /// returning the tile coordinates sampled along the way (inclusive of
    /// both endpoints' containing tiles, deduplicated consecutively).
    fn ray_tiles(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<(i32, i32)> {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let distance = dx.hypot(dy);
        let step = self.tile_size / 2.0;
        let steps = if step > 0.0 {
            let raw = (distance / step).ceil().max(1.0);
            // Safety: ray lengths are bounded by map extents, well under u32::MAX.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let steps = raw as u32;
            steps
        } else {
            1
        };

        let mut tiles = Vec::new();
        let mut last = None;
        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            let x = x1 + dx * t;
            let y = y1 + dy * t;
            let tile = self.pixel_to_tile(x, y);
            if last != Some(tile) {
                tiles.push(tile);
                last = Some(tile);
            }
        }
        tiles
    }

    /// Whether an unobstructed line of sight exists between two pixel
    /// coordinates. The ray is stepped in half-tile increments; any
    /// blocked tile along the way breaks sight.
    #[must_use]
    pub fn has_line_of_sight(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
        self.ray_tiles(x1, y1, x2, y2)
            .iter()
            .all(|&(tx, ty)| !self.is_blocked(tx, ty))
    }

    /// Count the number of contiguous blocked runs ("walls") crossed by
    /// the ray between two pixel coordinates. A run of N consecutive
    /// blocked tiles counts as one wall.
    #[must_use]
    pub fn count_walls_between(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> u32 {
        let mut walls = 0u32;
        let mut in_wall = false;
        for &(tx, ty) in &self.ray_tiles(x1, y1, x2, y2) {
            if self.is_blocked(tx, ty) {
                if !in_wall {
                    walls = walls.saturating_add(1);
                    in_wall = true;
                }
            } else {
                in_wall = false;
            }
        }
        walls
    }

    /// Return the building, if any, whose interior footprint contains the
    /// given pixel position.
    #[must_use]
    pub fn building_containing(&self, position: Position) -> Option<&BuildingPlacement> {
        let (tx, ty) = self.pixel_to_tile(position.x, position.y);
        self.buildings.iter().find(|b| b.contains_tile(tx, ty))
    }

    /// Return the building with the given id, if placed on this map.
    #[must_use]
    pub fn building(&self, id: StructureId) -> Option<&BuildingPlacement> {
        self.buildings.iter().find(|b| b.id == id)
    }
}
