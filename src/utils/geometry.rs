//! # Grid Geometry
//!
//! Line drawing on the integer grid.

use crate::game::Position;

/// Every cell on the Bresenham line from `start` to `end`, both included.
///
/// # Examples
///
/// ```
/// use delve::{bresenham_line, Position};
///
/// let line = bresenham_line(Position::new(0, 0), Position::new(3, 0));
/// assert_eq!(line.len(), 4);
/// assert_eq!(line[0], Position::new(0, 0));
/// assert_eq!(line[3], Position::new(3, 0));
/// ```
pub fn bresenham_line(start: Position, end: Position) -> Vec<Position> {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };

    let mut err = dx - dy;
    let mut current = start;
    let mut cells = Vec::with_capacity((dx.max(dy) + 1) as usize);

    loop {
        cells.push(current);
        if current == end {
            return cells;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            current.x += sx;
        }
        if e2 < dx {
            err += dx;
            current.y += sy;
        }
    }
}
