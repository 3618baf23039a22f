//! # World Module
//!
//! Level representation: the tile grid, the entities placed on it, and the
//! descent point leading to the next floor.

use crate::game::{Entity, EntityId, Position};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};

/// What a tile looks like, for frontends. Gameplay reads the flags on [`Tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Wall,
    Floor,
    DownStairs,
}

/// A single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    pub walkable: bool,
    pub transparent: bool,
    /// In the player's field of view this turn
    pub visible: bool,
    /// Has ever been visible
    pub explored: bool,
}

impl Tile {
    /// Creates an unexplored tile of the given type.
    pub fn new(tile_type: TileType) -> Self {
        let open = !matches!(tile_type, TileType::Wall);
        Self {
            tile_type,
            walkable: open,
            transparent: open,
            visible: false,
            explored: false,
        }
    }

    pub fn wall() -> Self {
        Self::new(TileType::Wall)
    }

    pub fn floor() -> Self {
        Self::new(TileType::Floor)
    }

    pub fn down_stairs() -> Self {
        Self::new(TileType::DownStairs)
    }
}

/// One floor of the dungeon.
///
/// Tiles are stored row-major (`tiles[y][x]`). Entities are kept in insertion
/// order; lookups that return "the first" entity follow that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Vec<Tile>>,
    pub entities: Vec<Entity>,
    downstairs: Option<Position>,
}

impl Level {
    /// Creates a level filled with walls.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Level, Position};
    ///
    /// let level = Level::new(20, 10);
    /// assert!(level.in_bounds(Position::new(19, 9)));
    /// assert!(!level.is_walkable(Position::new(5, 5)));
    /// ```
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![vec![Tile::wall(); width as usize]; height as usize],
            entities: Vec::new(),
            downstairs: None,
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles.get(pos.y as usize)?.get(pos.x as usize)
    }

    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles.get_mut(pos.y as usize)?.get_mut(pos.x as usize)
    }

    /// Replaces a tile, keeping its visibility state.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> DelveResult<()> {
        let slot = self.get_tile_mut(pos).ok_or_else(|| {
            DelveError::InvalidState(format!(
                "Position ({}, {}) is outside the level",
                pos.x, pos.y
            ))
        })?;
        *slot = Tile {
            visible: slot.visible,
            explored: slot.explored,
            ..tile
        };
        Ok(())
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.get_tile(pos).is_some_and(|tile| tile.walkable)
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.get_tile(pos).is_some_and(|tile| tile.visible)
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.get_tile(pos).is_some_and(|tile| tile.explored)
    }

    /// The descent point, if this floor has one.
    pub fn downstairs(&self) -> Option<Position> {
        self.downstairs
    }

    /// Makes `pos` the single descent point, turning any previous one back
    /// into floor.
    pub fn set_downstairs(&mut self, pos: Position) -> DelveResult<()> {
        if let Some(previous) = self.downstairs.take() {
            self.set_tile(previous, Tile::floor())?;
        }
        self.set_tile(pos, Tile::down_stairs())?;
        self.downstairs = Some(pos);
        Ok(())
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id == id)?;
        Some(self.entities.remove(index))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    /// First entity blocking movement at `pos`, skipping `except`.
    pub fn blocking_entity_at(&self, pos: Position, except: Option<EntityId>) -> Option<&Entity> {
        self.entities.iter().find(|entity| {
            entity.blocks_movement && entity.position == pos && Some(entity.id) != except
        })
    }

    /// First living actor at `pos`, skipping `except`.
    pub fn actor_at(&self, pos: Position, except: Option<EntityId>) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.is_alive() && entity.position == pos && Some(entity.id) != except)
    }

    pub fn items_at(&self, pos: Position) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |entity| entity.is_item() && entity.position == pos)
    }

    pub fn living_actors(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|entity| entity.is_alive())
    }

    /// Transparency of every tile, row-major, for the visibility service.
    pub fn transparency(&self) -> Vec<Vec<bool>> {
        self.tiles
            .iter()
            .map(|row| row.iter().map(|tile| tile.transparent).collect())
            .collect()
    }

    /// Replaces the visible set and marks every visible tile as explored.
    ///
    /// Exploration is never cleared.
    pub fn apply_visibility(&mut self, visible: &[Vec<bool>]) {
        for (y, row) in self.tiles.iter_mut().enumerate() {
            for (x, tile) in row.iter_mut().enumerate() {
                let is_visible = visible
                    .get(y)
                    .and_then(|cells| cells.get(x))
                    .copied()
                    .unwrap_or(false);
                tile.visible = is_visible;
                tile.explored |= is_visible;
            }
        }
    }
}
