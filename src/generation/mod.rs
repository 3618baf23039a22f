//! # Generation Module
//!
//! Procedural content generation: dungeon layouts, monsters and items.
//!
//! All randomness comes from the `StdRng` handed in by the caller, so a
//! fixed seed always produces the same layout and population.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::game::Position;
use crate::{config, DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation of one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonParams {
    /// Number of room placement attempts
    pub max_rooms: u32,
    /// Minimum room size, walls included
    pub room_min_size: i32,
    /// Maximum room size, walls included
    pub room_max_size: i32,
    pub map_width: i32,
    pub map_height: i32,
    pub max_monsters_per_room: u32,
    pub max_items_per_room: u32,
}

impl DungeonParams {
    /// Creates the standard configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::DungeonParams;
    ///
    /// let params = DungeonParams::new();
    /// assert_eq!(params.map_width, 80);
    /// assert!(params.room_max_size >= params.room_min_size);
    /// assert!(params.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            max_rooms: config::DEFAULT_MAX_ROOMS,
            room_min_size: config::DEFAULT_ROOM_MIN_SIZE,
            room_max_size: config::DEFAULT_ROOM_MAX_SIZE,
            map_width: config::DEFAULT_MAP_WIDTH,
            map_height: config::DEFAULT_MAP_HEIGHT,
            max_monsters_per_room: config::DEFAULT_MAX_MONSTERS_PER_ROOM,
            max_items_per_room: config::DEFAULT_MAX_ITEMS_PER_ROOM,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing() -> Self {
        Self {
            max_rooms: 8,
            room_min_size: 4,
            room_max_size: 7,
            map_width: 40,
            map_height: 24,
            max_monsters_per_room: 1,
            max_items_per_room: 1,
        }
    }

    /// Checks that every room the generator may roll fits on the map.
    pub fn validate(&self) -> DelveResult<()> {
        let fail = |reason: String| Err(DelveError::GenerationFailed(reason));

        if self.max_rooms == 0 {
            return fail("max_rooms must be at least 1".to_string());
        }
        if self.room_min_size < 2 {
            return fail(format!(
                "room_min_size must be at least 2, got {}",
                self.room_min_size
            ));
        }
        if self.room_min_size > self.room_max_size {
            return fail(format!(
                "room_min_size {} exceeds room_max_size {}",
                self.room_min_size, self.room_max_size
            ));
        }
        if self.map_width <= self.room_max_size || self.map_height <= self.room_max_size {
            return fail(format!(
                "a {}-tile room does not fit on a {}x{} map",
                self.room_max_size, self.map_width, self.map_height
            ));
        }
        Ok(())
    }
}

impl Default for DungeonParams {
    fn default() -> Self {
        Self::new()
    }
}

/// A rectangle used while laying out a floor.
///
/// `(x1, y1)` is the top-left corner and `(x2, y2)` lies `width`/`height`
/// tiles further. The border is wall; only the interior is carved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RectangularRoom {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RectangularRoom {
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, RectangularRoom};
    ///
    /// let room = RectangularRoom::new(2, 3, 6, 4);
    /// assert_eq!(room.center(), Position::new(5, 5));
    /// assert_eq!(room.inner_positions().len(), 5 * 3);
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.x1 + self.x2).div_euclid(2),
            (self.y1 + self.y2).div_euclid(2),
        )
    }

    /// Whether `pos` lies strictly inside the wall border.
    pub fn contains_inner(&self, pos: Position) -> bool {
        pos.x > self.x1 && pos.x < self.x2 && pos.y > self.y1 && pos.y < self.y2
    }

    /// Every carve-able cell, row by row.
    pub fn inner_positions(&self) -> Vec<Position> {
        ((self.y1 + 1)..self.y2)
            .flat_map(|y| ((self.x1 + 1)..self.x2).map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Closed-rectangle overlap; rooms that share an edge intersect.
    pub fn intersects(&self, other: &RectangularRoom) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }
}
