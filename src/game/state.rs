//! # Game State Module
//!
//! The session engine: the current level, the player, the message log and
//! the random source every other system draws from.
//!
//! Systems never hold references back into the engine. Actions, item effects
//! and AI receive `&mut Engine` for the duration of one call.

use crate::game::messages::colors;
use crate::game::{
    Actor, Entity, EntityId, FieldOfView, Level, LineOfSightFov, MessageLog, Position,
};
use crate::generation::{dagger, leather_armor, player, DungeonGenerator, DungeonParams};
use crate::{config, DelveError, DelveResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One play session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    /// The floor the player is on
    pub level: Level,
    /// The controlled actor
    pub player_id: EntityId,
    /// Parameters used for every floor of this session
    pub params: DungeonParams,
    /// Depth, starting at 1
    pub current_floor: u32,
    pub message_log: MessageLog,
    /// Completed turns
    pub turn_number: u64,
    pub fov_radius: u32,
    /// Not persisted; a restored session draws from a fresh seed
    #[serde(skip, default = "reseeded_rng")]
    pub rng: StdRng,
}

fn reseeded_rng() -> StdRng {
    StdRng::from_entropy()
}

impl Engine {
    /// Starts a new game: generates the first floor and equips the player
    /// with a dagger and leather armor.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonParams, Engine};
    ///
    /// let engine = Engine::new_game(DungeonParams::for_testing(), 42).unwrap();
    /// assert_eq!(engine.current_floor, 1);
    /// assert!(engine.is_player_alive());
    /// ```
    pub fn new_game(params: DungeonParams, seed: u64) -> DelveResult<Self> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut hero = player(Position::new(0, 0));
        let player_id = hero.id;
        let start = hero.position;
        if let Some(actor) = hero.as_actor_mut() {
            for item in [dagger(start), leather_armor(start)] {
                actor
                    .equipment
                    .equip(&item, None)
                    .map_err(|e| DelveError::InvalidState(e.to_string()))?;
                actor
                    .inventory
                    .add(item)
                    .map_err(|e| DelveError::InvalidState(e.to_string()))?;
            }
        }

        let level = DungeonGenerator::new().generate(&params, &mut rng, hero)?;
        let mut engine = Self {
            level,
            player_id,
            params,
            current_floor: 1,
            message_log: MessageLog::new(),
            turn_number: 0,
            fov_radius: config::FOV_RADIUS,
            rng,
        };
        engine.update_fov(&LineOfSightFov);
        engine.message_log.add_message(
            "Hello and welcome, adventurer, to yet another dungeon!",
            colors::WELCOME_TEXT,
        );

        info!("Started a new game with seed {}", seed);
        Ok(engine)
    }

    /// Wraps an existing level. The player must already be on it.
    pub fn with_level(level: Level, player_id: EntityId, params: DungeonParams, seed: u64) -> Self {
        Self {
            level,
            player_id,
            params,
            current_floor: 1,
            message_log: MessageLog::new(),
            turn_number: 0,
            fov_radius: config::FOV_RADIUS,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn player(&self) -> Option<&Entity> {
        self.level.entity(self.player_id)
    }

    pub fn player_actor(&self) -> Option<&Actor> {
        self.actor(self.player_id)
    }

    pub fn player_actor_mut(&mut self) -> Option<&mut Actor> {
        self.actor_mut(self.player_id)
    }

    pub fn player_position(&self) -> Option<Position> {
        self.player().map(|entity| entity.position)
    }

    pub fn is_player_alive(&self) -> bool {
        self.player().is_some_and(Entity::is_alive)
    }

    /// Actor components of the entity with this id on the current level.
    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.level.entity(id).and_then(Entity::as_actor)
    }

    pub fn actor_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.level.entity_mut(id).and_then(Entity::as_actor_mut)
    }

    /// Deals `amount` damage and applies the death transition if the hit was
    /// fatal. Returns whether the actor died from this hit.
    pub fn apply_damage(&mut self, id: EntityId, amount: i32) -> bool {
        match self.actor_mut(id) {
            Some(actor) => actor.fighter.take_damage(amount),
            None => return false,
        }
        self.check_death(id)
    }

    /// Turns an actor at zero hp into remains.
    ///
    /// Fires at most once per actor: the AI marker is cleared on the first
    /// call, and later calls find nothing to do. Killing a monster grants its
    /// experience to the player.
    pub fn check_death(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.level.entity_mut(id) else {
            return false;
        };
        let Some(actor) = entity.as_actor() else {
            return false;
        };
        if !actor.is_alive() || !actor.fighter.is_dead() {
            return false;
        }

        let name = entity.name.clone();
        let xp_given = actor.leveling.xp_given;
        entity.become_remains();

        if id == self.player_id {
            info!("Player died on floor {}", self.current_floor);
            self.message_log.add_message("You died!", colors::PLAYER_DIE);
        } else {
            debug!("{} died", name);
            if let Some(player) = self
                .level
                .entity_mut(self.player_id)
                .and_then(Entity::as_actor_mut)
            {
                player.leveling.add_xp(xp_given, &mut self.message_log);
            }
            self.message_log
                .add_message(format!("{} is dead!", name), colors::ENEMY_DIE);
        }
        true
    }

    /// Replaces the level with a freshly generated one and moves the player
    /// onto it.
    ///
    /// On error the current level is left as it was.
    pub fn descend(&mut self) -> DelveResult<()> {
        self.params.validate()?;
        let hero = self
            .level
            .remove_entity(self.player_id)
            .ok_or_else(|| {
                DelveError::InvalidState("Player is not on the current level".to_string())
            })?;

        match DungeonGenerator::new().generate(&self.params, &mut self.rng, hero.clone()) {
            Ok(level) => {
                self.level = level;
                self.current_floor += 1;
                info!("Descended to floor {}", self.current_floor);
                Ok(())
            }
            Err(error) => {
                self.level.add_entity(hero);
                Err(error)
            }
        }
    }

    /// Recomputes what the player sees. Exploration only ever grows.
    pub fn update_fov(&mut self, fov: &dyn FieldOfView) {
        let Some(origin) = self.player_position() else {
            return;
        };
        let visible = fov.compute_fov(&self.level.transparency(), origin, self.fov_radius);
        self.level.apply_visibility(&visible);
    }

    /// Saves the session to JSON.
    pub fn save_to_json(&self) -> DelveResult<String> {
        serde_json::to_string_pretty(self).map_err(DelveError::from)
    }

    /// Loads a session from JSON. The random source is reseeded.
    pub fn load_from_json(json: &str) -> DelveResult<Self> {
        let engine: Self = serde_json::from_str(json)?;
        if engine.player().is_none() {
            return Err(DelveError::InvalidState(
                "Saved session has no player on its level".to_string(),
            ));
        }
        Ok(engine)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> DelveResult<()> {
        fs::write(path.as_ref(), self.save_to_json()?)?;
        debug!("Saved session to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> DelveResult<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::load_from_json(&json)
    }
}
