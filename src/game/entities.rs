//! # Entities
//!
//! Positioned objects on a level. An entity is either an actor (something
//! that fights and carries things) or an item (something that can be picked
//! up, used or worn).

use crate::game::{
    new_entity_id, AiKind, Color, Consumable, EntityId, Equipment, Equippable, Fighter,
    Inventory, Leveling, Position,
};
use crate::game::messages::colors;
use serde::{Deserialize, Serialize};

/// Draw order tier. Higher tiers are drawn on top of lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    Corpse,
    Item,
    Actor,
}

/// A positioned object owned by exactly one level (or one inventory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    pub glyph: char,
    pub color: Color,
    pub name: String,
    pub blocks_movement: bool,
    pub render_order: RenderOrder,
    pub kind: EntityKind,
}

/// Variant-specific data of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Actor(Box<Actor>),
    Item(Item),
}

/// Components of an entity able to act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// `None` once the actor is dead
    pub ai: Option<AiKind>,
    pub fighter: Fighter,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub leveling: Leveling,
}

impl Actor {
    pub fn new(ai: AiKind, fighter: Fighter, inventory: Inventory, leveling: Leveling) -> Self {
        Self {
            ai: Some(ai),
            fighter,
            inventory,
            equipment: Equipment::new(),
            leveling,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.ai.is_some()
    }

    pub fn power(&self) -> i32 {
        self.fighter.power(&self.equipment)
    }

    pub fn defense(&self) -> i32 {
        self.fighter.defense(&self.equipment)
    }
}

/// Components of an entity that can be carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    pub consumable: Option<Consumable>,
    pub equippable: Option<Equippable>,
}

impl Entity {
    /// Creates a blocking actor entity.
    pub fn actor(
        name: impl Into<String>,
        glyph: char,
        color: Color,
        position: Position,
        actor: Actor,
    ) -> Self {
        Self {
            id: new_entity_id(),
            position,
            glyph,
            color,
            name: name.into(),
            blocks_movement: true,
            render_order: RenderOrder::Actor,
            kind: EntityKind::Actor(Box::new(actor)),
        }
    }

    /// Creates a non-blocking item entity.
    pub fn item(
        name: impl Into<String>,
        glyph: char,
        color: Color,
        position: Position,
        item: Item,
    ) -> Self {
        Self {
            id: new_entity_id(),
            position,
            glyph,
            color,
            name: name.into(),
            blocks_movement: false,
            render_order: RenderOrder::Item,
            kind: EntityKind::Item(item),
        }
    }

    pub fn as_actor(&self) -> Option<&Actor> {
        match &self.kind {
            EntityKind::Actor(actor) => Some(actor.as_ref()),
            EntityKind::Item(_) => None,
        }
    }

    pub fn as_actor_mut(&mut self) -> Option<&mut Actor> {
        match &mut self.kind {
            EntityKind::Actor(actor) => Some(actor.as_mut()),
            EntityKind::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match &self.kind {
            EntityKind::Item(item) => Some(item),
            EntityKind::Actor(_) => None,
        }
    }

    pub fn is_actor(&self) -> bool {
        self.as_actor().is_some()
    }

    pub fn is_item(&self) -> bool {
        self.as_item().is_some()
    }

    /// True for actors that still have an AI marker.
    pub fn is_alive(&self) -> bool {
        self.as_actor().is_some_and(Actor::is_alive)
    }

    /// Turns a living actor into its remains. Returns `false` (and changes
    /// nothing) when the entity is not a living actor.
    pub fn become_remains(&mut self) -> bool {
        let Some(actor) = self.as_actor_mut() else {
            return false;
        };
        if actor.ai.take().is_none() {
            return false;
        }

        self.glyph = '%';
        self.color = colors::CORPSE;
        self.blocks_movement = false;
        self.render_order = RenderOrder::Corpse;
        self.name = format!("Remains of {}", self.name);
        true
    }
}

/// Upper-cases the first letter, for sentences that start with a name.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
