//! # Encounter Generation
//!
//! The player and monster templates, and the monster roll used when
//! populating rooms.

use crate::config;
use crate::game::messages::colors;
use crate::game::{Actor, AiKind, Color, Entity, Fighter, Inventory, Leveling, Position};
use rand::rngs::StdRng;
use rand::Rng;

/// Chance that a spawned monster is an orc rather than a troll.
const ORC_CHANCE: f64 = 0.8;

/// Creates the controlled actor.
///
/// # Examples
///
/// ```
/// use delve::{player, Position};
///
/// let hero = player(Position::new(3, 3));
/// assert_eq!(hero.glyph, '@');
/// assert_eq!(hero.as_actor().unwrap().fighter.hp(), 30);
/// ```
pub fn player(position: Position) -> Entity {
    Entity::actor(
        "Player",
        '@',
        colors::WHITE,
        position,
        Actor::new(
            AiKind::Controlled,
            Fighter::new(30, 1, 2),
            Inventory::new(config::PLAYER_INVENTORY_CAPACITY),
            Leveling::new(config::PLAYER_LEVEL_UP_BASE, 0),
        ),
    )
}

pub fn orc(position: Position) -> Entity {
    monster("Orc", 'o', Color(63, 127, 63), position, Fighter::new(10, 0, 3), 35)
}

pub fn troll(position: Position) -> Entity {
    monster("Troll", 'T', Color(0, 127, 0), position, Fighter::new(16, 1, 4), 100)
}

fn monster(
    name: &str,
    glyph: char,
    color: Color,
    position: Position,
    fighter: Fighter,
    xp_given: i32,
) -> Entity {
    Entity::actor(
        name,
        glyph,
        color,
        position,
        Actor::new(AiKind::hostile(), fighter, Inventory::new(0), Leveling::new(0, xp_given)),
    )
}

/// Rolls a monster for a room.
pub fn spawn_monster(rng: &mut StdRng, position: Position) -> Entity {
    if rng.gen::<f64>() < ORC_CHANCE {
        orc(position)
    } else {
        troll(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_player_template() {
        let hero = player(Position::new(1, 1));
        let actor = hero.as_actor().unwrap();
        assert_eq!(actor.ai, Some(AiKind::Controlled));
        assert_eq!(actor.power(), 2);
        assert_eq!(actor.defense(), 1);
        assert_eq!(actor.inventory.capacity(), 26);
        assert_eq!(actor.leveling.level_up_base, 200);
    }

    #[test]
    fn test_monster_templates() {
        let orc = orc(Position::new(0, 0));
        let troll = troll(Position::new(0, 0));
        assert_eq!(orc.as_actor().unwrap().leveling.xp_given, 35);
        assert_eq!(troll.as_actor().unwrap().fighter.max_hp(), 16);
        assert!(orc.blocks_movement && troll.blocks_movement);
    }

    #[test]
    fn test_spawn_mix_is_mostly_orcs() {
        let mut rng = StdRng::seed_from_u64(17);
        let orcs = (0..500)
            .filter(|_| spawn_monster(&mut rng, Position::new(0, 0)).name == "Orc")
            .count();
        assert!((300..=480).contains(&orcs), "got {} orcs", orcs);
    }
}
