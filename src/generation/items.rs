//! # Item Generation
//!
//! Item templates and the loot table used when populating rooms.

use crate::game::{Color, Consumable, Entity, Equippable, Item, Position};
use rand::rngs::StdRng;
use rand::Rng;

const SCROLL_GLYPH: char = '~';

fn consumable(
    name: &str,
    glyph: char,
    color: Color,
    position: Position,
    effect: Consumable,
) -> Entity {
    Entity::item(
        name,
        glyph,
        color,
        position,
        Item {
            consumable: Some(effect),
            equippable: None,
        },
    )
}

fn equippable(
    name: &str,
    glyph: char,
    color: Color,
    position: Position,
    bonuses: Equippable,
) -> Entity {
    Entity::item(
        name,
        glyph,
        color,
        position,
        Item {
            consumable: None,
            equippable: Some(bonuses),
        },
    )
}

pub fn health_potion(position: Position) -> Entity {
    consumable(
        "Health Potion",
        '!',
        Color(127, 0, 255),
        position,
        Consumable::Healing { amount: 4 },
    )
}

pub fn lightning_scroll(position: Position) -> Entity {
    consumable(
        "Lightning Scroll",
        SCROLL_GLYPH,
        Color(255, 255, 0),
        position,
        Consumable::Lightning {
            damage: 20,
            max_range: 5,
        },
    )
}

pub fn fireball_scroll(position: Position) -> Entity {
    consumable(
        "Fireball Scroll",
        SCROLL_GLYPH,
        Color(255, 0, 0),
        position,
        Consumable::Fireball {
            damage: 12,
            radius: 3,
        },
    )
}

pub fn confusion_scroll(position: Position) -> Entity {
    consumable(
        "Confusion Scroll",
        SCROLL_GLYPH,
        Color(207, 63, 255),
        position,
        Consumable::Confusion { turns: 10 },
    )
}

pub fn dagger(position: Position) -> Entity {
    equippable("Dagger", '/', Color(0, 191, 255), position, Equippable::weapon(2))
}

pub fn sword(position: Position) -> Entity {
    equippable("Sword", '/', Color(0, 191, 255), position, Equippable::weapon(4))
}

pub fn leather_armor(position: Position) -> Entity {
    equippable("Leather Armor", '[', Color(139, 69, 19), position, Equippable::armor(1))
}

pub fn chain_mail(position: Position) -> Entity {
    equippable("Chain Mail", '[', Color(139, 69, 19), position, Equippable::armor(3))
}

/// Rolls an item for a room. Potions are the most common find.
pub fn spawn_item(rng: &mut StdRng, position: Position) -> Entity {
    let roll: f64 = rng.gen();
    if roll < 0.6 {
        health_potion(position)
    } else if roll < 0.7 {
        fireball_scroll(position)
    } else if roll < 0.8 {
        confusion_scroll(position)
    } else if roll < 0.9 {
        lightning_scroll(position)
    } else if roll < 0.95 {
        sword(position)
    } else {
        chain_mail(position)
    }
}
