//! # Path Finding
//!
//! A* over a level for monster movement.

use crate::game::{Level, Position};
use ::pathfinding::prelude::astar;

/// Cost multiplier for a straight step.
const CARDINAL_COST: u32 = 2;
/// Cost multiplier for a diagonal step.
const DIAGONAL_COST: u32 = 3;
/// Extra cost of a cell holding a blocking entity, so monsters route around
/// each other instead of queueing in corridors.
const CROWD_COST: u32 = 10;

/// Shortest path from `start` to `goal` through walkable cells.
///
/// The returned steps exclude `start` and include `goal`. Cells occupied by
/// blocking entities are passable but expensive. `None` when no route exists.
pub fn find_path(level: &Level, start: Position, goal: Position) -> Option<Vec<Position>> {
    if !level.in_bounds(goal) {
        return None;
    }

    let cell_cost = |pos: Position| -> Option<u32> {
        if !level.is_walkable(pos) {
            return None;
        }
        let crowded = level.blocking_entity_at(pos, None).is_some();
        Some(if crowded { 1 + CROWD_COST } else { 1 })
    };

    let (path, _cost) = astar(
        &start,
        |&pos| {
            pos.adjacent_positions()
                .into_iter()
                .filter_map(|next| {
                    let step = if next.x != pos.x && next.y != pos.y {
                        DIAGONAL_COST
                    } else {
                        CARDINAL_COST
                    };
                    cell_cost(next).map(|cost| (next, cost * step))
                })
                .collect::<Vec<_>>()
        },
        |&pos| pos.chebyshev_distance(goal) * CARDINAL_COST,
        |&pos| pos == goal,
    )?;

    Some(path.into_iter().skip(1).collect())
}
