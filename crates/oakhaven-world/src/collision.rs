//! Collision resolution for resident movement.
//!
//! Given a starting position and a requested new position, try the full
//! move; on collision, try wall-sliding along each axis independently;
//! if both axes are blocked, leave the resident in place.

use oakhaven_types::Position;

use crate::tile_map::TileMap;

/// Result of attempting to move a resident from one position to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// The resident's position after collision resolution.
    pub position: Position,
    /// Whether the move was fully blocked (no axis made progress).
    pub blocked: bool,
}

/// Resolve a requested move against the tile map, applying wall-sliding.
///
/// Tries, in order: the full diagonal move, an x-only move, then a y-only
/// move. If none succeed the resident stays at `from` and `blocked` is
/// `true`.
#[must_use]
pub fn resolve_move(
    map: &TileMap,
    from: Position,
    requested: Position,
    half_hitbox: f64,
) -> MoveOutcome {
    if !map.is_position_blocked(requested.x, requested.y, half_hitbox) {
        return MoveOutcome {
            position: requested,
            blocked: false,
        };
    }

    let x_only = Position::new(requested.x, from.y);
    if !map.is_position_blocked(x_only.x, x_only.y, half_hitbox) {
        return MoveOutcome {
            position: x_only,
            blocked: false,
        };
    }

    let y_only = Position::new(from.x, requested.y);
    if !map.is_position_blocked(y_only.x, y_only.y, half_hitbox) {
        return MoveOutcome {
            position: y_only,
            blocked: false,
        };
    }

    MoveOutcome {
        position: from,
        blocked: true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn grid(width: usize, height: usize, blocked: &[(usize, usize)]) -> Vec<bool> {
        let mut obstacles = vec![false; width * height];
        for &(tx, ty) in blocked {
            if let Some(slot) = obstacles.get_mut(ty * width + tx) {
                *slot = true;
            }
        }
        obstacles
    }

    #[test]
    fn unobstructed_move_succeeds_fully() {
        let map = TileMap::new(
            10,
            10,
            32.0,
            grid(10, 10, &[]),
            Vec::new(),
            Vec::new(),
            Position::new(16.0, 16.0),
        )
        .expect("valid map");
        let outcome = resolve_move(&map, Position::new(16.0, 16.0), Position::new(48.0, 16.0), 8.0);
        assert!(!outcome.blocked);
        assert_eq!(outcome.position, Position::new(48.0, 16.0));
    }

    #[test]
    fn diagonal_move_slides_along_open_axis() {
        // Block tile (2,0) so a move that would land at x=80 is blocked,
        // but the y-only component (staying at x=16) succeeds.
        let map = TileMap::new(
            10,
            10,
            32.0,
            grid(10, 10, &[(2, 0)]),
            Vec::new(),
            Vec::new(),
            Position::new(16.0, 16.0),
        )
        .expect("valid map");
        let outcome = resolve_move(
            &map,
            Position::new(16.0, 16.0),
            Position::new(80.0, 48.0),
            8.0,
        );
        assert!(!outcome.blocked);
        assert_eq!(outcome.position, Position::new(16.0, 48.0));
    }

    #[test]
    fn fully_enclosed_move_is_blocked() {
        let blocked = [(1, 0), (0, 1), (1, 1)];
        let map = TileMap::new(
            10,
            10,
            32.0,
            grid(10, 10, &blocked),
            Vec::new(),
            Vec::new(),
            Position::new(16.0, 16.0),
        )
        .expect("valid map");
        let outcome = resolve_move(
            &map,
            Position::new(16.0, 16.0),
            Position::new(48.0, 48.0),
            8.0,
        );
        assert!(outcome.blocked);
        assert_eq!(outcome.position, Position::new(16.0, 16.0));
    }
}
