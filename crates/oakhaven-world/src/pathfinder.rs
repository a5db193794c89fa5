//! A* pathfinding over the walkable-tile graph.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use oakhaven_types::Position;

use crate::error::WorldError;
use crate::tile_map::TileMap;

/// 4-connected cardinal neighbour offsets.
const CARDINAL_NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 4 diagonal neighbour offsets, only used when both adjacent cardinal
/// neighbours are clear (no corner-cutting through a wall).
const DIAGONAL_NEIGHBOURS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    f_score: u64,
    insertion_order: u64,
    tile: (i32, i32),
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert f_score to get the minimum
        // first. Tie-break on the later-inserted node, per spec: pick the
        // larger insertion_order when f_scores match, which is the
        // natural max-heap order already.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| self.insertion_order.cmp(&other.insertion_order))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn manhattan_heuristic(a: (i32, i32), b: (i32, i32)) -> u64 {
    let dx = a.0.abs_diff(b.0);
    let dy = a.1.abs_diff(b.1);
    u64::from(dx.saturating_add(dy))
}

/// Find a path from `start` to `goal` in pixel space, returning an ordered
/// list of pixel waypoints ending at `goal`.
///
/// Uses 4-connectivity by default; diagonal steps are permitted only when
/// both cardinal neighbours adjacent to the diagonal are clear, preventing
/// cutting across a wall corner. The heuristic is Manhattan distance
/// scaled by tile size; ties in f-score prefer the later-inserted node.
///
/// # Errors
///
/// Returns [`WorldError::PathEndpointBlocked`] if either endpoint's tile is
/// blocked, or [`WorldError::NoPathFound`] if no walkable route connects
/// them.
pub fn find_path(
    map: &TileMap,
    start: Position,
    goal: Position,
    allow_diagonals: bool,
) -> Result<Vec<Position>, WorldError> {
    let start_tile = map.pixel_to_tile(start.x, start.y);
    let goal_tile = map.pixel_to_tile(goal.x, goal.y);

    if map.is_blocked(start_tile.0, start_tile.1) || map.is_blocked(goal_tile.0, goal_tile.1) {
        return Err(WorldError::PathEndpointBlocked);
    }

    if start_tile == goal_tile {
        return Ok(vec![goal]);
    }

    let mut open = BinaryHeap::new();
    let mut insertion_counter = 0u64;
    let mut came_from: BTreeMap<(i32, i32), (i32, i32)> = BTreeMap::new();
    let mut g_score: BTreeMap<(i32, i32), u64> = BTreeMap::new();

    g_score.insert(start_tile, 0);
    open.push(Node {
        f_score: manhattan_heuristic(start_tile, goal_tile),
        insertion_order: insertion_counter,
        tile: start_tile,
    });

    let mut neighbours = Vec::from(CARDINAL_NEIGHBOURS);
    if allow_diagonals {
        neighbours.extend(DIAGONAL_NEIGHBOURS);
    }

    while let Some(current) = open.pop() {
        if current.tile == goal_tile {
            return Ok(reconstruct_path(map, &came_from, current.tile, goal));
        }

        let current_g = *g_score.get(&current.tile).unwrap_or(&u64::MAX);

        for &(dx, dy) in &neighbours {
            let neighbour = (current.tile.0.saturating_add(dx), current.tile.1.saturating_add(dy));
            if map.is_blocked(neighbour.0, neighbour.1) {
                continue;
            }
            // Block diagonal corner-cutting: both flanking cardinals must
            // be clear.
            if dx != 0 && dy != 0 {
                let flank_a = (current.tile.0.saturating_add(dx), current.tile.1);
                let flank_b = (current.tile.0, current.tile.1.saturating_add(dy));
                if map.is_blocked(flank_a.0, flank_a.1) || map.is_blocked(flank_b.0, flank_b.1) {
                    continue;
                }
            }

            let step_cost: u64 = if dx != 0 && dy != 0 { 14 } else { 10 };
            let tentative_g = current_g.saturating_add(step_cost);

            let existing = g_score.get(&neighbour).copied().unwrap_or(u64::MAX);
            if tentative_g < existing {
                came_from.insert(neighbour, current.tile);
                g_score.insert(neighbour, tentative_g);
                insertion_counter = insertion_counter.saturating_add(1);
                open.push(Node {
                    f_score: tentative_g
                        .saturating_add(manhattan_heuristic(neighbour, goal_tile).saturating_mul(10)),
                    insertion_order: insertion_counter,
                    tile: neighbour,
                });
            }
        }
    }

    Err(WorldError::NoPathFound)
}

fn reconstruct_path(
    map: &TileMap,
    came_from: &BTreeMap<(i32, i32), (i32, i32)>,
    mut current: (i32, i32),
    goal_position: Position,
) -> Vec<Position> {
    let mut tiles = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        tiles.push(prev);
        current = prev;
    }
    tiles.reverse();

    let half_tile = map.tile_size / 2.0;
    let mut waypoints: Vec<Position> = tiles
        .iter()
        .skip(1)
        .map(|&(tx, ty)| {
            Position::new(
                f64::from(tx) * map.tile_size + half_tile,
                f64::from(ty) * map.tile_size + half_tile,
            )
        })
        .collect();

    if let Some(last) = waypoints.last_mut() {
        *last = goal_position;
    } else {
        waypoints.push(goal_position);
    }
    waypoints
}
