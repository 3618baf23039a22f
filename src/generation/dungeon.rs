//! # Dungeon Generation
//!
//! Room-and-corridor layout generation.
//!
//! The generator:
//! 1. Tries `max_rooms` random rectangles, discarding any that intersect an
//!    accepted room
//! 2. Carves each accepted room and joins it to the previous one with an
//!    L-shaped tunnel
//! 3. Populates each room with monsters and items
//! 4. Puts the stairs down at the center of the last room

use crate::game::{Entity, Level, Position, Tile};
use crate::generation::{spawn_item, spawn_monster, DungeonParams, RectangularRoom};
use crate::utils::bresenham_line;
use crate::{DelveError, DelveResult};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Primary dungeon generator using the room-and-corridor algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a floor and places `player` at the center of its first room.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{player, DungeonGenerator, DungeonParams, Position};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let hero = player(Position::new(0, 0));
    /// let id = hero.id;
    /// let level = DungeonGenerator::new()
    ///     .generate(&DungeonParams::for_testing(), &mut rng, hero)
    ///     .unwrap();
    ///
    /// let start = level.entity(id).unwrap().position;
    /// assert!(level.is_walkable(start));
    /// assert!(level.downstairs().is_some());
    /// ```
    pub fn generate(
        &self,
        params: &DungeonParams,
        rng: &mut StdRng,
        player: Entity,
    ) -> DelveResult<Level> {
        self.generate_with_rooms(params, rng, player)
            .map(|(level, _)| level)
    }

    /// Like [`generate`](Self::generate), also returning the accepted rooms in
    /// placement order.
    pub fn generate_with_rooms(
        &self,
        params: &DungeonParams,
        rng: &mut StdRng,
        player: Entity,
    ) -> DelveResult<(Level, Vec<RectangularRoom>)> {
        params.validate()?;

        let mut level = Level::new(params.map_width, params.map_height);
        let mut rooms: Vec<RectangularRoom> = Vec::new();
        let mut player = Some(player);
        let mut populated = 0usize;

        for _ in 0..params.max_rooms {
            let width = rng.gen_range(params.room_min_size..=params.room_max_size);
            let height = rng.gen_range(params.room_min_size..=params.room_max_size);
            let x = rng.gen_range(0..=params.map_width - width - 1);
            let y = rng.gen_range(0..=params.map_height - height - 1);
            let room = RectangularRoom::new(x, y, width, height);

            if rooms.iter().any(|other| room.intersects(other)) {
                continue;
            }

            for pos in room.inner_positions() {
                level.set_tile(pos, Tile::floor())?;
            }

            match rooms.last() {
                None => {
                    if let Some(mut hero) = player.take() {
                        hero.position = room.center();
                        level.add_entity(hero);
                    }
                }
                Some(previous) => {
                    for pos in tunnel_between(rng, previous.center(), room.center()) {
                        level.set_tile(pos, Tile::floor())?;
                    }
                }
            }

            populated += place_entities(&room, &mut level, rng, params);
            rooms.push(room);
        }

        let last = rooms
            .last()
            .ok_or_else(|| DelveError::GenerationFailed("No room could be placed".to_string()))?;
        level.set_downstairs(last.center())?;

        debug!(
            "Generated {}x{} floor: {} rooms, {} entities placed",
            params.map_width,
            params.map_height,
            rooms.len(),
            populated
        );
        Ok((level, rooms))
    }
}

/// An L-shaped tunnel from `start` to `end`.
///
/// The corner is picked at random: horizontal leg first or vertical leg
/// first. Both legs are Bresenham lines with their endpoints included, so
/// the corner appears twice.
pub fn tunnel_between(rng: &mut StdRng, start: Position, end: Position) -> Vec<Position> {
    let corner = if rng.gen::<f64>() < 0.5 {
        Position::new(end.x, start.y)
    } else {
        Position::new(start.x, end.y)
    };

    let mut cells = bresenham_line(start, corner);
    cells.extend(bresenham_line(corner, end));
    cells
}

/// Drops monsters, then items, on random interior cells of `room`.
///
/// A cell is skipped only when something placed by this same call already
/// stands there; entities from earlier rooms are not checked. Returns how
/// many entities were added.
fn place_entities(
    room: &RectangularRoom,
    level: &mut Level,
    rng: &mut StdRng,
    params: &DungeonParams,
) -> usize {
    let monsters = rng.gen_range(0..=params.max_monsters_per_room);
    let items = rng.gen_range(0..=params.max_items_per_room);
    let mut taken: Vec<Position> = Vec::new();

    let random_cell = |rng: &mut StdRng| {
        Position::new(
            rng.gen_range(room.x1 + 1..=room.x2 - 1),
            rng.gen_range(room.y1 + 1..=room.y2 - 1),
        )
    };

    for _ in 0..monsters {
        let pos = random_cell(rng);
        if !taken.contains(&pos) {
            taken.push(pos);
            level.add_entity(spawn_monster(rng, pos));
        }
    }
    for _ in 0..items {
        let pos = random_cell(rng);
        if !taken.contains(&pos) {
            taken.push(pos);
            level.add_entity(spawn_item(rng, pos));
        }
    }

    taken.len()
}
