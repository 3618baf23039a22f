//! # Consumables
//!
//! Effects of usable items. A successful activation uses up the item; a
//! failed one changes nothing.

use crate::game::messages::colors;
use crate::game::{AiKind, Consumable, Engine, EntityId, Impossible, Position};

/// Everything an item effect may touch while it resolves.
pub struct ItemContext<'a> {
    pub engine: &'a mut Engine,
    /// Actor using the item
    pub user: EntityId,
    /// The item being used, still in the user's inventory
    pub item: EntityId,
    /// Chosen cell; the user's own cell when no target was given
    pub target: Position,
}

impl ItemContext<'_> {
    fn user_position(&self) -> Result<Position, Impossible> {
        self.engine
            .level
            .entity(self.user)
            .map(|entity| entity.position)
            .ok_or_else(|| Impossible::new("There is no one here to act."))
    }

    fn item_name(&self) -> Result<String, Impossible> {
        self.engine
            .actor(self.user)
            .and_then(|actor| actor.inventory.get(self.item))
            .map(|item| item.name.clone())
            .ok_or_else(|| Impossible::new("You do not carry that item."))
    }

    fn consume(&mut self) {
        if let Some(actor) = self.engine.actor_mut(self.user) {
            actor.inventory.remove(self.item);
        }
    }
}

impl Consumable {
    /// Resolves the effect, then removes the item from the user's inventory.
    pub fn activate(&self, context: &mut ItemContext<'_>) -> Result<(), Impossible> {
        let item_name = context.item_name()?;

        match *self {
            Consumable::Healing { amount } => heal(context, &item_name, amount)?,
            Consumable::Lightning { damage, max_range } => {
                lightning(context, damage, max_range)?
            }
            Consumable::Fireball { damage, radius } => fireball(context, damage, radius)?,
            Consumable::Confusion { turns } => confuse(context, turns)?,
        }

        context.consume();
        Ok(())
    }
}

fn heal(context: &mut ItemContext<'_>, item_name: &str, amount: i32) -> Result<(), Impossible> {
    let engine = &mut *context.engine;
    let recovered = engine
        .actor_mut(context.user)
        .map_or(0, |actor| actor.fighter.heal(amount));

    if recovered <= 0 {
        return Err(Impossible::new("Your health is already full."));
    }

    engine.message_log.add_message(
        format!("You consume the {}, and recover {} HP!", item_name, recovered),
        colors::HEALTH_RECOVERED,
    );
    Ok(())
}

fn lightning(context: &mut ItemContext<'_>, damage: i32, max_range: i32) -> Result<(), Impossible> {
    let origin = context.user_position()?;
    let engine = &mut *context.engine;

    let mut closest_distance = max_range as f64 + 1.0;
    let mut target = None;
    for actor in engine.level.living_actors() {
        if actor.id == context.user || !engine.level.is_visible(actor.position) {
            continue;
        }
        let distance = origin.euclidean_distance(actor.position);
        if distance < closest_distance {
            closest_distance = distance;
            target = Some((actor.id, actor.name.clone()));
        }
    }

    let Some((target_id, target_name)) = target else {
        return Err(Impossible::new("No enemy is close enough to strike."));
    };

    engine.message_log.add_message(
        format!(
            "A lighting bolt strikes the {} with a loud thunder, for {} damage!",
            target_name, damage
        ),
        colors::WHITE,
    );
    engine.apply_damage(target_id, damage);
    Ok(())
}

fn fireball(context: &mut ItemContext<'_>, damage: i32, radius: i32) -> Result<(), Impossible> {
    let target = context.target;
    let engine = &mut *context.engine;

    if !engine.level.is_visible(target) {
        return Err(Impossible::new("You cannot target an area that you cannot see."));
    }

    let victims: Vec<(EntityId, String)> = engine
        .level
        .living_actors()
        .filter(|actor| actor.position.euclidean_distance(target) <= radius as f64)
        .map(|actor| (actor.id, actor.name.clone()))
        .collect();

    if victims.is_empty() {
        return Err(Impossible::new("There are no targets in the radius."));
    }

    for (id, name) in victims {
        engine.message_log.add_message(
            format!("The {} is engulfed in a fiery explosion, taking {} damage!", name, damage),
            colors::WHITE,
        );
        engine.apply_damage(id, damage);
    }
    Ok(())
}

fn confuse(context: &mut ItemContext<'_>, turns: u32) -> Result<(), Impossible> {
    let target = context.target;
    let user = context.user;
    let engine = &mut *context.engine;

    if !engine.level.is_visible(target) {
        return Err(Impossible::new("You cannot target an area that you cannot see."));
    }

    let (victim_id, victim_name) = engine
        .level
        .actor_at(target, None)
        .map(|actor| (actor.id, actor.name.clone()))
        .ok_or_else(|| Impossible::new("You must select an enemy to target."))?;
    if victim_id == user {
        return Err(Impossible::new("You cannot confuse yourself!"));
    }

    engine.message_log.add_message(
        format!(
            "The eyes of the {} look vacant, as it starts to stumble around!",
            victim_name
        ),
        colors::STATUS_EFFECT_APPLIED,
    );
    if let Some(actor) = engine.actor_mut(victim_id) {
        let previous = actor.ai.take().unwrap_or_else(AiKind::hostile);
        actor.ai = Some(AiKind::Confused {
            previous: Box::new(previous),
            turns_remaining: turns,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Action, ActionKind, Entity, Level, Tile};
    use crate::generation::{
        confusion_scroll, fireball_scroll, health_potion, lightning_scroll, orc, player,
        DungeonParams,
    };

    /// Open 12x12 room, everything visible, player at (2, 2).
    fn lit_room() -> Engine {
        let mut level = Level::new(12, 12);
        for y in 1..11 {
            for x in 1..11 {
                level.set_tile(Position::new(x, y), Tile::floor()).unwrap();
            }
        }
        level.apply_visibility(&vec![vec![true; 12]; 12]);
        let hero = player(Position::new(2, 2));
        let player_id = hero.id;
        level.add_entity(hero);
        Engine::with_level(level, player_id, DungeonParams::for_testing(), 3)
    }

    fn give(engine: &mut Engine, item: Entity) -> EntityId {
        let id = item.id;
        engine.player_actor_mut().unwrap().inventory.add(item).unwrap();
        id
    }

    fn spawn(engine: &mut Engine, monster: Entity) -> EntityId {
        let id = monster.id;
        engine.level.add_entity(monster);
        id
    }

    fn use_item(
        engine: &mut Engine,
        item: EntityId,
        target: Option<Position>,
    ) -> Result<(), Impossible> {
        Action::new(engine.player_id, ActionKind::UseItem { item, target })
            .perform(engine)
            .map(|_| ())
    }

    #[test]
    fn test_healing_restores_and_consumes() {
        let mut engine = lit_room();
        engine.player_actor_mut().unwrap().fighter.take_damage(10);
        let potion = give(&mut engine, health_potion(Position::new(0, 0)));

        use_item(&mut engine, potion, None).unwrap();

        let player = engine.player_actor().unwrap();
        assert_eq!(player.fighter.hp(), 24);
        assert!(player.inventory.is_empty());
        assert_eq!(
            engine.message_log.last().unwrap().text,
            "You consume the Health Potion, and recover 4 HP!"
        );
    }

    #[test]
    fn test_healing_at_full_health_keeps_item() {
        let mut engine = lit_room();
        let potion = give(&mut engine, health_potion(Position::new(0, 0)));

        let err = use_item(&mut engine, potion, None).unwrap_err();
        assert_eq!(err.reason(), "Your health is already full.");
        assert_eq!(engine.player_actor().unwrap().inventory.len(), 1);
    }

    #[test]
    fn test_lightning_hits_closest_visible_enemy() {
        let mut engine = lit_room();
        let near = spawn(&mut engine, orc(Position::new(4, 2)));
        let far = spawn(&mut engine, orc(Position::new(6, 2)));
        let scroll = give(&mut engine, lightning_scroll(Position::new(0, 0)));

        use_item(&mut engine, scroll, None).unwrap();

        assert!(!engine.level.entity(near).unwrap().is_alive());
        assert!(engine.level.entity(far).unwrap().is_alive());
        assert!(engine
            .message_log
            .contains("A lighting bolt strikes the Orc with a loud thunder, for 20 damage!"));
    }

    #[test]
    fn test_lightning_without_enemy_in_range() {
        let mut engine = lit_room();
        spawn(&mut engine, orc(Position::new(10, 10)));
        let scroll = give(&mut engine, lightning_scroll(Position::new(0, 0)));

        let err = use_item(&mut engine, scroll, None).unwrap_err();
        assert_eq!(err.reason(), "No enemy is close enough to strike.");
        assert_eq!(engine.player_actor().unwrap().inventory.len(), 1);
    }

    #[test]
    fn test_fireball_hits_everyone_in_radius() {
        let mut engine = lit_room();
        let a = spawn(&mut engine, orc(Position::new(8, 8)));
        let b = spawn(&mut engine, orc(Position::new(9, 8)));
        let c = spawn(&mut engine, orc(Position::new(2, 9)));
        let scroll = give(&mut engine, fireball_scroll(Position::new(0, 0)));

        use_item(&mut engine, scroll, Some(Position::new(8, 8))).unwrap();

        assert!(!engine.level.entity(a).unwrap().is_alive());
        assert!(!engine.level.entity(b).unwrap().is_alive());
        assert!(engine.level.entity(c).unwrap().is_alive());
        assert_eq!(engine.player_actor().unwrap().fighter.hp(), 30);
    }

    #[test]
    fn test_fireball_needs_visible_target() {
        let mut engine = lit_room();
        let scroll = give(&mut engine, fireball_scroll(Position::new(0, 0)));
        engine.level.apply_visibility(&vec![vec![false; 12]; 12]);

        let err = use_item(&mut engine, scroll, Some(Position::new(8, 8))).unwrap_err();
        assert_eq!(err.reason(), "You cannot target an area that you cannot see.");
    }

    #[test]
    fn test_fireball_empty_radius() {
        let mut engine = lit_room();
        let scroll = give(&mut engine, fireball_scroll(Position::new(0, 0)));

        let err = use_item(&mut engine, scroll, Some(Position::new(9, 9))).unwrap_err();
        assert_eq!(err.reason(), "There are no targets in the radius.");
    }

    #[test]
    fn test_confusion_replaces_ai() {
        let mut engine = lit_room();
        let victim = spawn(&mut engine, orc(Position::new(5, 5)));
        let scroll = give(&mut engine, confusion_scroll(Position::new(0, 0)));

        use_item(&mut engine, scroll, Some(Position::new(5, 5))).unwrap();

        match &engine.actor(victim).unwrap().ai {
            Some(AiKind::Confused {
                previous,
                turns_remaining,
            }) => {
                assert_eq!(**previous, AiKind::hostile());
                assert_eq!(*turns_remaining, 10);
            }
            other => panic!("unexpected ai {:?}", other),
        }
    }

    #[test]
    fn test_confusion_target_rules() {
        let mut engine = lit_room();
        let scroll = give(&mut engine, confusion_scroll(Position::new(0, 0)));

        let err = use_item(&mut engine, scroll, Some(Position::new(7, 7))).unwrap_err();
        assert_eq!(err.reason(), "You must select an enemy to target.");

        let err = use_item(&mut engine, scroll, None).unwrap_err();
        assert_eq!(err.reason(), "You cannot confuse yourself!");
        assert_eq!(engine.player_actor().unwrap().inventory.len(), 1);
    }
}
