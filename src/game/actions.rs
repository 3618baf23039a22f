//! # Action Pipeline
//!
//! Every intent an actor can express, and the rules that apply it to the
//! session.
//!
//! An action either succeeds and consumes the actor's turn, fails with an
//! [`Impossible`] reason that leaves the world untouched, or asks the
//! session to end through [`Turn::EndSession`].

use crate::game::messages::colors;
use crate::game::{capitalize, Engine, Entity, EntityId, Position, SessionEnd};
use log::trace;
use serde::{Deserialize, Serialize};

/// An ordinary, recoverable failure: the action could not be carried out.
///
/// The reason is shown to the player verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Impossible {
    reason: String,
}

impl Impossible {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Outcome of a successful action.
#[derive(Debug)]
pub enum Turn {
    /// The actor's turn was used
    Taken,
    /// The session must stop
    EndSession(SessionEnd),
}

/// What an actor wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Escape,
    Wait,
    Movement { dx: i32, dy: i32 },
    Melee { dx: i32, dy: i32 },
    /// Attack if a living actor is in the way, walk otherwise
    Bump { dx: i32, dy: i32 },
    Pickup,
    Drop { item: EntityId },
    Equip { item: EntityId },
    UseItem { item: EntityId, target: Option<Position> },
    TakeStairs,
}

/// An intent bound to the actor performing it.
///
/// # Examples
///
/// ```
/// use delve::{Action, ActionKind, new_entity_id};
///
/// let actor = new_entity_id();
/// let action = Action::bump(actor, 1, 0);
/// assert_eq!(action.kind, ActionKind::Bump { dx: 1, dy: 0 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub actor: EntityId,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(actor: EntityId, kind: ActionKind) -> Self {
        Self { actor, kind }
    }

    pub fn escape(actor: EntityId) -> Self {
        Self::new(actor, ActionKind::Escape)
    }

    pub fn wait(actor: EntityId) -> Self {
        Self::new(actor, ActionKind::Wait)
    }

    pub fn movement(actor: EntityId, dx: i32, dy: i32) -> Self {
        Self::new(actor, ActionKind::Movement { dx, dy })
    }

    pub fn melee(actor: EntityId, dx: i32, dy: i32) -> Self {
        Self::new(actor, ActionKind::Melee { dx, dy })
    }

    pub fn bump(actor: EntityId, dx: i32, dy: i32) -> Self {
        Self::new(actor, ActionKind::Bump { dx, dy })
    }

    /// Applies the action to the session.
    ///
    /// On `Err` nothing observable has changed.
    pub fn perform(&self, engine: &mut Engine) -> Result<Turn, Impossible> {
        trace!("{:?} performs {:?}", self.actor, self.kind);

        match self.kind {
            ActionKind::Escape => Ok(Turn::EndSession(SessionEnd::Escape)),
            ActionKind::Wait => Ok(Turn::Taken),
            ActionKind::Movement { dx, dy } => self.move_by(engine, dx, dy),
            ActionKind::Melee { dx, dy } => self.attack(engine, dx, dy),
            ActionKind::Bump { dx, dy } => {
                let destination = actor_position(engine, self.actor)?.offset(dx, dy);
                if engine.level.actor_at(destination, Some(self.actor)).is_some() {
                    self.attack(engine, dx, dy)
                } else {
                    self.move_by(engine, dx, dy)
                }
            }
            ActionKind::Pickup => self.pick_up(engine),
            ActionKind::Drop { item } => self.drop_item(engine, item),
            ActionKind::Equip { item } => self.equip(engine, item),
            ActionKind::UseItem { item, target } => self.use_item(engine, item, target),
            ActionKind::TakeStairs => self.take_stairs(engine),
        }
    }

    fn move_by(&self, engine: &mut Engine, dx: i32, dy: i32) -> Result<Turn, Impossible> {
        let destination = actor_position(engine, self.actor)?.offset(dx, dy);
        let level = &mut engine.level;

        if !level.in_bounds(destination)
            || !level.is_walkable(destination)
            || level.blocking_entity_at(destination, Some(self.actor)).is_some()
        {
            return Err(Impossible::new("The way is blocked."));
        }

        if let Some(entity) = level.entity_mut(self.actor) {
            entity.position = destination;
        }
        Ok(Turn::Taken)
    }

    fn attack(&self, engine: &mut Engine, dx: i32, dy: i32) -> Result<Turn, Impossible> {
        let attacker = acting_entity(engine, self.actor)?;
        let power = attacker.as_actor().map_or(0, |actor| actor.power());
        let attacker_name = capitalize(&attacker.name);
        let destination = attacker.position.offset(dx, dy);

        let target = engine
            .level
            .actor_at(destination, Some(self.actor))
            .ok_or_else(|| Impossible::new("Nothing to attack."))?;
        let target_id = target.id;
        let defense = target.as_actor().map_or(0, |actor| actor.defense());
        let description = format!("{} attacks {}", attacker_name, target.name);

        let color = if self.actor == engine.player_id {
            colors::PLAYER_ATK
        } else {
            colors::ENEMY_ATK
        };

        let damage = power - defense;
        if damage > 0 {
            engine
                .message_log
                .add_message(format!("{} for {} hit points.", description, damage), color);
            engine.apply_damage(target_id, damage);
        } else {
            engine
                .message_log
                .add_message(format!("{} but does no damage.", description), color);
        }
        Ok(Turn::Taken)
    }

    fn pick_up(&self, engine: &mut Engine) -> Result<Turn, Impossible> {
        let position = actor_position(engine, self.actor)?;
        let item_id = engine
            .level
            .items_at(position)
            .next()
            .map(|item| item.id)
            .ok_or_else(|| Impossible::new("There is nothing here to pick up."))?;

        let has_room = engine
            .actor(self.actor)
            .is_some_and(|actor| !actor.inventory.is_full());
        if !has_room {
            return Err(Impossible::new("Your inventory is full."));
        }

        let Some(item) = engine.level.remove_entity(item_id) else {
            return Err(Impossible::new("There is nothing here to pick up."));
        };
        let name = item.name.clone();

        let rejected = match engine.actor_mut(self.actor) {
            Some(actor) => actor.inventory.add(item).err().map(|full| full.0),
            None => Some(item),
        };
        if let Some(item) = rejected {
            engine.level.add_entity(item);
            return Err(Impossible::new("Your inventory is full."));
        }

        engine
            .message_log
            .add_message(format!("You picked up the {}!", name), colors::WHITE);
        Ok(Turn::Taken)
    }

    fn drop_item(&self, engine: &mut Engine, item_id: EntityId) -> Result<Turn, Impossible> {
        let position = actor_position(engine, self.actor)?;
        let Engine {
            level, message_log, ..
        } = engine;

        let actor = level
            .entity_mut(self.actor)
            .and_then(Entity::as_actor_mut)
            .ok_or_else(not_an_actor)?;
        let item = actor.inventory.get(item_id).ok_or_else(not_carried)?;

        if actor.equipment.is_equipped(item_id) {
            actor.equipment.toggle(item, message_log)?;
        }

        let mut item = actor.inventory.remove(item_id).ok_or_else(not_carried)?;
        item.position = position;
        message_log.add_message(format!("You dropped the {}.", item.name), colors::WHITE);
        level.add_entity(item);
        Ok(Turn::Taken)
    }

    fn equip(&self, engine: &mut Engine, item_id: EntityId) -> Result<Turn, Impossible> {
        let Engine {
            level, message_log, ..
        } = engine;

        let actor = level
            .entity_mut(self.actor)
            .and_then(Entity::as_actor_mut)
            .ok_or_else(not_an_actor)?;
        let item = actor.inventory.get(item_id).ok_or_else(not_carried)?;
        actor.equipment.toggle(item, message_log)?;
        Ok(Turn::Taken)
    }

    fn use_item(
        &self,
        engine: &mut Engine,
        item_id: EntityId,
        target: Option<Position>,
    ) -> Result<Turn, Impossible> {
        let position = actor_position(engine, self.actor)?;
        let actor = engine.actor(self.actor).ok_or_else(not_an_actor)?;
        let item = actor.inventory.get(item_id).ok_or_else(not_carried)?;
        let consumable = item
            .as_item()
            .and_then(|data| data.consumable)
            .ok_or_else(|| Impossible::new(format!("The {} cannot be used.", item.name)))?;

        let mut context = crate::game::ItemContext {
            engine,
            user: self.actor,
            item: item_id,
            target: target.unwrap_or(position),
        };
        consumable.activate(&mut context)?;
        Ok(Turn::Taken)
    }

    fn take_stairs(&self, engine: &mut Engine) -> Result<Turn, Impossible> {
        let position = actor_position(engine, self.actor)?;
        if self.actor != engine.player_id || engine.level.downstairs() != Some(position) {
            return Err(Impossible::new("There are no stairs here."));
        }

        if let Err(error) = engine.descend() {
            return Ok(Turn::EndSession(SessionEnd::Fault(error)));
        }
        engine
            .message_log
            .add_message("You descend the staircase.", colors::DESCEND);
        Ok(Turn::Taken)
    }
}

fn acting_entity(engine: &Engine, id: EntityId) -> Result<&Entity, Impossible> {
    engine
        .level
        .entity(id)
        .filter(|entity| entity.is_actor())
        .ok_or_else(not_an_actor)
}

fn actor_position(engine: &Engine, id: EntityId) -> Result<Position, Impossible> {
    acting_entity(engine, id).map(|entity| entity.position)
}

fn not_an_actor() -> Impossible {
    Impossible::new("There is no one here to act.")
}

fn not_carried() -> Impossible {
    Impossible::new("You do not carry that item.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Actor, AiKind, Color, Fighter, Inventory, Leveling, Level, Tile};
    use crate::generation::{dagger, health_potion, leather_armor, DungeonParams};

    fn fighter_entity(name: &str, position: Position, hp: i32, defense: i32, power: i32) -> Entity {
        Entity::actor(
            name,
            'x',
            Color(255, 255, 255),
            position,
            Actor::new(
                AiKind::hostile(),
                Fighter::new(hp, defense, power),
                Inventory::new(2),
                Leveling::new(0, 10),
            ),
        )
    }

    /// 7x7 level with an open 5x5 interior and the player at (2, 2).
    fn arena() -> Engine {
        let mut level = Level::new(7, 7);
        for y in 1..6 {
            for x in 1..6 {
                level.set_tile(Position::new(x, y), Tile::floor()).unwrap();
            }
        }
        let mut player = fighter_entity("Player", Position::new(2, 2), 30, 0, 5);
        if let Some(actor) = player.as_actor_mut() {
            actor.ai = Some(AiKind::Controlled);
            actor.leveling = Leveling::new(200, 0);
        }
        let player_id = player.id;
        level.add_entity(player);
        Engine::with_level(level, player_id, DungeonParams::for_testing(), 7)
    }

    #[test]
    fn test_wait_always_succeeds() {
        let mut engine = arena();
        let action = Action::wait(engine.player_id);
        assert!(matches!(action.perform(&mut engine), Ok(Turn::Taken)));
    }

    #[test]
    fn test_escape_ends_session() {
        let mut engine = arena();
        let result = Action::escape(engine.player_id).perform(&mut engine);
        assert!(matches!(result, Ok(Turn::EndSession(SessionEnd::Escape))));
    }

    #[test]
    fn test_movement_into_floor() {
        let mut engine = arena();
        Action::movement(engine.player_id, 1, 1).perform(&mut engine).unwrap();
        assert_eq!(engine.player_position(), Some(Position::new(3, 3)));
    }

    #[test]
    fn test_movement_in_place_succeeds() {
        let mut engine = arena();
        assert!(Action::movement(engine.player_id, 0, 0).perform(&mut engine).is_ok());
        assert_eq!(engine.player_position(), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_movement_into_wall_is_blocked() {
        let mut engine = arena();
        Action::movement(engine.player_id, -1, 0).perform(&mut engine).unwrap();
        let err = Action::movement(engine.player_id, -1, 0)
            .perform(&mut engine)
            .unwrap_err();
        assert_eq!(err.reason(), "The way is blocked.");
        assert_eq!(engine.player_position(), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_movement_out_of_bounds_is_blocked() {
        let mut engine = arena();
        let err = Action::movement(engine.player_id, -10, 0)
            .perform(&mut engine)
            .unwrap_err();
        assert_eq!(err.reason(), "The way is blocked.");
    }

    #[test]
    fn test_movement_blocked_by_actor() {
        let mut engine = arena();
        engine
            .level
            .add_entity(fighter_entity("Orc", Position::new(3, 2), 10, 0, 3));
        assert!(Action::movement(engine.player_id, 1, 0).perform(&mut engine).is_err());
        assert_eq!(engine.player_position(), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_melee_damage_law() {
        let mut engine = arena();
        let orc = fighter_entity("Orc", Position::new(3, 2), 10, 2, 3);
        let orc_id = orc.id;
        engine.level.add_entity(orc);

        Action::melee(engine.player_id, 1, 0).perform(&mut engine).unwrap();

        assert_eq!(engine.actor(orc_id).unwrap().fighter.hp(), 7);
        assert_eq!(
            engine.message_log.last().unwrap().text,
            "Player attacks Orc for 3 hit points."
        );
        assert_eq!(engine.message_log.last().unwrap().color, colors::PLAYER_ATK);
    }

    #[test]
    fn test_melee_without_damage_still_succeeds() {
        let mut engine = arena();
        let golem = fighter_entity("Golem", Position::new(3, 2), 10, 9, 3);
        let golem_id = golem.id;
        engine.level.add_entity(golem);

        assert!(Action::melee(engine.player_id, 1, 0).perform(&mut engine).is_ok());
        assert_eq!(engine.actor(golem_id).unwrap().fighter.hp(), 10);
        assert_eq!(
            engine.message_log.last().unwrap().text,
            "Player attacks Golem but does no damage."
        );
    }

    #[test]
    fn test_melee_needs_target() {
        let mut engine = arena();
        let err = Action::melee(engine.player_id, 1, 0)
            .perform(&mut engine)
            .unwrap_err();
        assert_eq!(err.reason(), "Nothing to attack.");
        assert!(engine.message_log.is_empty());
    }

    #[test]
    fn test_bump_attacks_or_moves() {
        let mut engine = arena();
        let orc = fighter_entity("Orc", Position::new(3, 2), 10, 0, 3);
        let orc_id = orc.id;
        engine.level.add_entity(orc);

        Action::bump(engine.player_id, 1, 0).perform(&mut engine).unwrap();
        assert_eq!(engine.actor(orc_id).unwrap().fighter.hp(), 5);
        assert_eq!(engine.player_position(), Some(Position::new(2, 2)));

        Action::bump(engine.player_id, 0, 1).perform(&mut engine).unwrap();
        assert_eq!(engine.player_position(), Some(Position::new(2, 3)));
    }

    #[test]
    fn test_pickup_first_item() {
        let mut engine = arena();
        let potion = health_potion(Position::new(2, 2));
        let potion_id = potion.id;
        engine.level.add_entity(potion);

        Action::new(engine.player_id, ActionKind::Pickup)
            .perform(&mut engine)
            .unwrap();

        assert!(engine.level.entity(potion_id).is_none());
        assert!(engine.player_actor().unwrap().inventory.get(potion_id).is_some());
        assert_eq!(
            engine.message_log.last().unwrap().text,
            "You picked up the Health Potion!"
        );
    }

    #[test]
    fn test_pickup_nothing_here() {
        let mut engine = arena();
        let err = Action::new(engine.player_id, ActionKind::Pickup)
            .perform(&mut engine)
            .unwrap_err();
        assert_eq!(err.reason(), "There is nothing here to pick up.");
    }

    #[test]
    fn test_pickup_full_inventory_leaves_item() {
        let mut engine = arena();
        for _ in 0..3 {
            engine.level.add_entity(health_potion(Position::new(2, 2)));
        }
        let pickup = Action::new(engine.player_id, ActionKind::Pickup);
        pickup.perform(&mut engine).unwrap();
        pickup.perform(&mut engine).unwrap();

        let err = pickup.perform(&mut engine).unwrap_err();
        assert_eq!(err.reason(), "Your inventory is full.");
        assert_eq!(engine.level.items_at(Position::new(2, 2)).count(), 1);
        assert_eq!(engine.player_actor().unwrap().inventory.len(), 2);
    }

    #[test]
    fn test_drop_unequips_first() {
        let mut engine = arena();
        let armor = leather_armor(Position::new(0, 0));
        let armor_id = armor.id;
        engine.player_actor_mut().unwrap().inventory.add(armor).unwrap();

        Action::new(engine.player_id, ActionKind::Equip { item: armor_id })
            .perform(&mut engine)
            .unwrap();
        assert_eq!(engine.player_actor().unwrap().defense(), 1);

        Action::new(engine.player_id, ActionKind::Drop { item: armor_id })
            .perform(&mut engine)
            .unwrap();

        let player = engine.player_actor().unwrap();
        assert_eq!(player.defense(), 0);
        assert!(player.inventory.is_empty());
        let dropped = engine.level.entity(armor_id).unwrap();
        assert_eq!(dropped.position, Position::new(2, 2));
        assert_eq!(
            engine.message_log.recent_texts(2),
            vec!["You remove the Leather Armor.", "You dropped the Leather Armor."]
        );
    }

    #[test]
    fn test_drop_unknown_item() {
        let mut engine = arena();
        let stranger = crate::game::new_entity_id();
        let err = Action::new(engine.player_id, ActionKind::Drop { item: stranger })
            .perform(&mut engine)
            .unwrap_err();
        assert_eq!(err.reason(), "You do not carry that item.");
    }

    #[test]
    fn test_equip_toggles() {
        let mut engine = arena();
        let weapon = dagger(Position::new(0, 0));
        let weapon_id = weapon.id;
        engine.player_actor_mut().unwrap().inventory.add(weapon).unwrap();
        let equip = Action::new(engine.player_id, ActionKind::Equip { item: weapon_id });

        equip.perform(&mut engine).unwrap();
        assert_eq!(engine.player_actor().unwrap().power(), 7);
        equip.perform(&mut engine).unwrap();
        assert_eq!(engine.player_actor().unwrap().power(), 5);
    }

    #[test]
    fn test_use_non_consumable() {
        let mut engine = arena();
        let weapon = dagger(Position::new(0, 0));
        let weapon_id = weapon.id;
        engine.player_actor_mut().unwrap().inventory.add(weapon).unwrap();

        let err = Action::new(
            engine.player_id,
            ActionKind::UseItem {
                item: weapon_id,
                target: None,
            },
        )
        .perform(&mut engine)
        .unwrap_err();
        assert_eq!(err.reason(), "The Dagger cannot be used.");
    }

    #[test]
    fn test_take_stairs_requires_descent_point() {
        let mut engine = arena();
        let err = Action::new(engine.player_id, ActionKind::TakeStairs)
            .perform(&mut engine)
            .unwrap_err();
        assert_eq!(err.reason(), "There are no stairs here.");
        assert_eq!(engine.current_floor, 1);
    }

    #[test]
    fn test_take_stairs_descends() {
        let mut engine = arena();
        engine.level.set_downstairs(Position::new(2, 2)).unwrap();
        let player_id = engine.player_id;

        let turn = Action::new(player_id, ActionKind::TakeStairs)
            .perform(&mut engine)
            .unwrap();

        assert!(matches!(turn, Turn::Taken));
        assert_eq!(engine.current_floor, 2);
        assert!(engine.level.entity(player_id).is_some());
        assert_eq!(
            engine.message_log.last().unwrap().text,
            "You descend the staircase."
        );
    }
}
