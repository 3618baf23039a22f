//! # Field of View
//!
//! The visibility service the turn scheduler consults once per turn.
//!
//! The kernel treats visibility as an opaque pure function. [`LineOfSightFov`]
//! is the implementation shipped with the crate; frontends may plug in any
//! other algorithm through [`FieldOfView`].

use crate::game::Position;
use crate::utils::bresenham_line;

/// Computes which cells are visible from an origin.
pub trait FieldOfView {
    /// `transparent` is row-major (`[y][x]`); the result has the same shape.
    fn compute_fov(
        &self,
        transparent: &[Vec<bool>],
        origin: Position,
        radius: u32,
    ) -> Vec<Vec<bool>>;
}

/// Ray casting: a cell within the radius is visible when the Bresenham ray
/// from the origin reaches it without crossing an opaque cell. Opaque cells
/// themselves (walls) are visible when the ray stops on them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineOfSightFov;

impl FieldOfView for LineOfSightFov {
    fn compute_fov(
        &self,
        transparent: &[Vec<bool>],
        origin: Position,
        radius: u32,
    ) -> Vec<Vec<bool>> {
        let height = transparent.len() as i32;
        let width = transparent.first().map_or(0, |row| row.len()) as i32;
        let mut visible = vec![vec![false; width as usize]; height as usize];

        let in_bounds = |p: Position| p.x >= 0 && p.y >= 0 && p.x < width && p.y < height;
        if !in_bounds(origin) {
            return visible;
        }
        let is_transparent = |p: Position| transparent[p.y as usize][p.x as usize];

        let r = radius as i32;
        for y in (origin.y - r).max(0)..=(origin.y + r).min(height - 1) {
            for x in (origin.x - r).max(0)..=(origin.x + r).min(width - 1) {
                let target = Position::new(x, y);
                if origin.euclidean_distance(target) > radius as f64 {
                    continue;
                }

                let ray = bresenham_line(origin, target);
                let blocked = ray
                    .iter()
                    .skip(1)
                    .take(ray.len().saturating_sub(2))
                    .any(|&cell| !is_transparent(cell));
                if !blocked {
                    visible[y as usize][x as usize] = true;
                }
            }
        }

        visible
    }
}
