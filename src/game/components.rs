//! # Components
//!
//! Capabilities attached to actors and items: combat stats, inventory,
//! equipment, experience, the AI marker and item effects.
//!
//! Components hold data and compute derived values. Anything that needs the
//! rest of the world (the player, the level, the message log) receives it as
//! an explicit argument.

use crate::game::messages::colors;
use crate::game::{Entity, EntityId, Impossible, MessageLog, Position};
use log::info;
use serde::{Deserialize, Serialize};

/// Hit points and base combat stats of an actor.
///
/// `hp` is kept in `[0, max_hp]` on every write. Reaching zero does not kill
/// anything by itself; the engine applies the death transition explicitly
/// (see [`crate::Engine::check_death`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    max_hp: i32,
    hp: i32,
    pub base_power: i32,
    pub base_defense: i32,
}

impl Fighter {
    /// Creates a fighter at full health.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Fighter;
    ///
    /// let fighter = Fighter::new(30, 1, 2);
    /// assert_eq!(fighter.hp(), 30);
    /// assert_eq!(fighter.max_hp(), 30);
    /// ```
    pub fn new(max_hp: i32, base_defense: i32, base_power: i32) -> Self {
        let max_hp = max_hp.max(0);
        Self {
            max_hp,
            hp: max_hp,
            base_power,
            base_defense,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Writes hp, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, value: i32) {
        self.hp = value.clamp(0, self.max_hp);
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Attack strength including equipment bonuses.
    pub fn power(&self, equipment: &Equipment) -> i32 {
        self.base_power + equipment.power_bonus()
    }

    /// Damage reduction including equipment bonuses.
    pub fn defense(&self, equipment: &Equipment) -> i32 {
        self.base_defense + equipment.defense_bonus()
    }

    /// Restores up to `amount` hp and returns how much was actually recovered.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Fighter;
    ///
    /// let mut fighter = Fighter::new(10, 0, 1);
    /// fighter.take_damage(3);
    /// assert_eq!(fighter.heal(5), 3);
    /// assert_eq!(fighter.hp(), 10);
    /// ```
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old_hp = self.hp;
        self.set_hp(self.hp.saturating_add(amount.max(0)));
        self.hp - old_hp
    }

    /// Lowers hp by exactly `amount` before clamping.
    pub fn take_damage(&mut self, amount: i32) {
        self.set_hp(self.hp.saturating_sub(amount));
    }
}

/// Slot an equippable item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
}

/// Static bonuses granted by an item while equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equippable {
    pub slot: EquipmentSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
}

impl Equippable {
    pub fn weapon(power_bonus: i32) -> Self {
        Self {
            slot: EquipmentSlot::Weapon,
            power_bonus: power_bonus.max(0),
            defense_bonus: 0,
        }
    }

    pub fn armor(defense_bonus: i32) -> Self {
        Self {
            slot: EquipmentSlot::Armor,
            power_bonus: 0,
            defense_bonus: defense_bonus.max(0),
        }
    }
}

/// Reference to an equipped inventory item along with its bonuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub item_id: EntityId,
    pub name: String,
    pub bonuses: Equippable,
}

/// The items an actor currently wears, one per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    weapon: Option<EquippedItem>,
    armor: Option<EquippedItem>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: EquipmentSlot) -> Option<&EquippedItem> {
        match slot {
            EquipmentSlot::Weapon => self.weapon.as_ref(),
            EquipmentSlot::Armor => self.armor.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<EquippedItem> {
        match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
        }
    }

    fn equipped(&self) -> impl Iterator<Item = &EquippedItem> {
        self.weapon.iter().chain(self.armor.iter())
    }

    pub fn power_bonus(&self) -> i32 {
        self.equipped().map(|item| item.bonuses.power_bonus).sum()
    }

    pub fn defense_bonus(&self) -> i32 {
        self.equipped().map(|item| item.bonuses.defense_bonus).sum()
    }

    pub fn is_equipped(&self, item_id: EntityId) -> bool {
        self.equipped().any(|item| item.item_id == item_id)
    }

    /// Puts `item` into its slot, removing whatever occupied it first.
    ///
    /// Equipping the item that already occupies the slot changes nothing.
    /// Messages go to `log` when one is given.
    pub fn equip(
        &mut self,
        item: &Entity,
        mut log: Option<&mut MessageLog>,
    ) -> Result<(), Impossible> {
        let bonuses = equippable_of(item)?;

        if let Some(current) = self.slot(bonuses.slot) {
            if current.item_id == item.id {
                return Ok(());
            }
            self.unequip(bonuses.slot, log.as_deref_mut());
        }

        *self.slot_mut(bonuses.slot) = Some(EquippedItem {
            item_id: item.id,
            name: item.name.clone(),
            bonuses,
        });
        if let Some(log) = log {
            log.add_message(format!("You equip the {}.", item.name), colors::WHITE);
        }
        Ok(())
    }

    /// Empties `slot`, returning the item reference that was there.
    pub fn unequip(
        &mut self,
        slot: EquipmentSlot,
        log: Option<&mut MessageLog>,
    ) -> Option<EquippedItem> {
        let removed = self.slot_mut(slot).take();
        if let (Some(removed), Some(log)) = (removed.as_ref(), log) {
            log.add_message(format!("You remove the {}.", removed.name), colors::WHITE);
        }
        removed
    }

    /// Equips `item`, or takes it off if it is the one currently in its slot.
    pub fn toggle(&mut self, item: &Entity, log: &mut MessageLog) -> Result<(), Impossible> {
        let bonuses = equippable_of(item)?;
        if self.slot(bonuses.slot).map(|current| current.item_id) == Some(item.id) {
            self.unequip(bonuses.slot, Some(log));
            Ok(())
        } else {
            self.equip(item, Some(log))
        }
    }
}

fn equippable_of(item: &Entity) -> Result<Equippable, Impossible> {
    item.as_item()
        .and_then(|data| data.equippable)
        .ok_or_else(|| Impossible::new(format!("The {} cannot be equipped.", item.name)))
}

/// Returned when an item does not fit; hands the item back to the caller.
#[derive(Debug, thiserror::Error)]
#[error("Your inventory is full.")]
pub struct InventoryFull(pub Entity);

/// Items carried by an actor, in pickup order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    capacity: usize,
    items: Vec<Entity>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Appends an item unless the inventory is at capacity.
    pub fn add(&mut self, item: Entity) -> Result<(), InventoryFull> {
        if self.is_full() {
            return Err(InventoryFull(item));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, item_id: EntityId) -> Option<&Entity> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Removes an item, keeping the order of the remaining ones.
    pub fn remove(&mut self, item_id: EntityId) -> Option<Entity> {
        let index = self.items.iter().position(|item| item.id == item_id)?;
        Some(self.items.remove(index))
    }

    pub fn items(&self) -> &[Entity] {
        &self.items
    }
}

/// Experience tracking for actors.
///
/// Monsters only use `xp_given`; the player accumulates experience and
/// levels up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leveling {
    pub current_level: i32,
    pub current_xp: i32,
    pub level_up_base: i32,
    pub level_up_factor: i32,
    /// Experience granted to the player when this actor dies
    pub xp_given: i32,
}

impl Leveling {
    pub fn new(level_up_base: i32, xp_given: i32) -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            level_up_base,
            level_up_factor: crate::config::LEVEL_UP_FACTOR,
            xp_given,
        }
    }

    pub fn experience_to_next_level(&self) -> i32 {
        self.level_up_base + self.current_level * self.level_up_factor
    }

    pub fn requires_level_up(&self) -> bool {
        self.current_xp > self.experience_to_next_level()
    }

    /// Adds experience and announces it, advancing as many levels as the
    /// new total pays for. Actors that cannot level (`level_up_base == 0`)
    /// ignore it.
    pub fn add_xp(&mut self, xp: i32, log: &mut MessageLog) {
        if xp <= 0 || self.level_up_base == 0 {
            return;
        }

        self.current_xp += xp;
        log.add_message(format!("You gain {} experience points.", xp), colors::WHITE);

        while self.requires_level_up() {
            self.increase_level();
            info!("Advanced to level {}", self.current_level);
            log.add_message(
                format!("You advance to level {}!", self.current_level),
                colors::WHITE,
            );
        }
    }

    /// Spends the experience needed for the next level.
    pub fn increase_level(&mut self) {
        self.current_xp -= self.experience_to_next_level();
        self.current_level += 1;
    }
}

/// Behavior marker of an actor. Present while the actor is alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiKind {
    /// Driven by the input collaborator
    Controlled,
    /// Chases and attacks the player; remembers the last computed path
    Hostile { path: Vec<Position> },
    /// Stumbles around randomly, then returns to `previous`
    Confused {
        previous: Box<AiKind>,
        turns_remaining: u32,
    },
}

impl AiKind {
    pub fn hostile() -> Self {
        AiKind::Hostile { path: Vec::new() }
    }
}

/// Effect triggered when an item is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    Healing { amount: i32 },
    Lightning { damage: i32, max_range: i32 },
    Fireball { damage: i32, radius: i32 },
    Confusion { turns: u32 },
}

impl Consumable {
    /// Whether the effect needs a target cell chosen by the player.
    pub fn needs_target(&self) -> bool {
        matches!(self, Consumable::Fireball { .. } | Consumable::Confusion { .. })
    }
}
