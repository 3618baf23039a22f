//! # Delve
//!
//! The simulation kernel of a turn-based dungeon crawler.
//!
//! ## Architecture Overview
//!
//! Delve decides what happens when an actor attempts something, how combat and
//! death resolve, how equipment changes combat stats, how turns alternate
//! between the player and the monsters, and how each floor is generated:
//!
//! - **Entity Model**: Actors and items with their attached components
//! - **Generation System**: Rooms, corridors and population of a floor
//! - **Action System**: Command pattern for every intent an actor can have
//! - **Turn Scheduler**: One player action, then every monster, then FOV
//!
//! Rendering, key bindings and the save byte format live outside the kernel.
//! Everything that needs randomness takes an explicit seeded RNG, so a fixed
//! seed reproduces the same dungeon.

pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

/// Core error type for the Delve engine.
///
/// Action failures are not represented here; see [`Impossible`].
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_MAP_WIDTH: i32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_MAP_HEIGHT: i32 = 43;

    /// Room placement attempts per floor
    pub const DEFAULT_MAX_ROOMS: u32 = 30;

    /// Smallest room side, walls included
    pub const DEFAULT_ROOM_MIN_SIZE: i32 = 6;

    /// Largest room side, walls included
    pub const DEFAULT_ROOM_MAX_SIZE: i32 = 10;

    pub const DEFAULT_MAX_MONSTERS_PER_ROOM: u32 = 2;

    pub const DEFAULT_MAX_ITEMS_PER_ROOM: u32 = 2;

    /// Radius of the player's field of view
    pub const FOV_RADIUS: u32 = 8;

    /// Number of item slots in the player's inventory
    pub const PLAYER_INVENTORY_CAPACITY: usize = 26;

    /// Default save file written when the session ends
    pub const SAVE_FILE_NAME: &str = "savegame.json";

    /// Experience needed for the first level-up
    pub const PLAYER_LEVEL_UP_BASE: i32 = 200;

    /// Extra experience needed per level already gained
    pub const LEVEL_UP_FACTOR: i32 = 150;
}
