//! # Input Module
//!
//! Turns player commands into actions.
//!
//! The kernel only needs something that can produce the next [`Action`];
//! [`InputSource`] is that seam. Line-based commands are parsed here so the
//! demo binary and tests share one vocabulary.

use crate::game::{Action, ActionKind, Engine, Position};
use std::collections::VecDeque;

/// Supplies the player's next action.
pub trait InputSource {
    fn next_action(&mut self, engine: &Engine) -> Action;
}

/// Player input types produced by [`parse_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Move or attack in a direction (relative position)
    Move(Position),
    /// Wait/rest for one turn
    Wait,
    /// Pick up the item under the player
    PickUp,
    /// Drop the n-th inventory item (1-based)
    Drop(usize),
    /// Equip or remove the n-th inventory item (1-based)
    Equip(usize),
    /// Use the n-th inventory item, optionally at a target cell
    Use(usize, Option<Position>),
    /// Take the stairs down
    Descend,
    /// Quit the game
    Quit,
}

/// Parses one line of player input.
///
/// Movement uses the vi keys (`h j k l y u b n`), `.` waits, `g` picks up,
/// `>` descends and `q` quits. Inventory commands take a 1-based index:
/// `drop 2`, `equip 1`, `use 3 10 4`.
///
/// # Examples
///
/// ```
/// use delve::{parse_command, PlayerInput, Position};
///
/// assert_eq!(parse_command("l"), Some(PlayerInput::Move(Position::new(1, 0))));
/// assert_eq!(parse_command("use 2 5 6"), Some(PlayerInput::Use(2, Some(Position::new(5, 6)))));
/// assert_eq!(parse_command("dance"), None);
/// ```
pub fn parse_command(line: &str) -> Option<PlayerInput> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let numbers: Vec<i64> = words.map(str::parse).collect::<Result<_, _>>().ok()?;

    let index = || match numbers.first() {
        Some(&n) if n >= 1 => usize::try_from(n).ok(),
        _ => None,
    };

    let input = match command {
        "h" => PlayerInput::Move(Position::new(-1, 0)),
        "j" => PlayerInput::Move(Position::new(0, 1)),
        "k" => PlayerInput::Move(Position::new(0, -1)),
        "l" => PlayerInput::Move(Position::new(1, 0)),
        "y" => PlayerInput::Move(Position::new(-1, -1)),
        "u" => PlayerInput::Move(Position::new(1, -1)),
        "b" => PlayerInput::Move(Position::new(-1, 1)),
        "n" => PlayerInput::Move(Position::new(1, 1)),
        "." => PlayerInput::Wait,
        "g" => PlayerInput::PickUp,
        ">" => PlayerInput::Descend,
        "q" => PlayerInput::Quit,
        "drop" if numbers.len() == 1 => PlayerInput::Drop(index()?),
        "equip" if numbers.len() == 1 => PlayerInput::Equip(index()?),
        "use" if numbers.len() == 1 => PlayerInput::Use(index()?, None),
        "use" if numbers.len() == 3 => {
            let x = i32::try_from(numbers[1]).ok()?;
            let y = i32::try_from(numbers[2]).ok()?;
            PlayerInput::Use(index()?, Some(Position::new(x, y)))
        }
        _ => return None,
    };

    let takes_arguments = matches!(
        input,
        PlayerInput::Drop(_) | PlayerInput::Equip(_) | PlayerInput::Use(..)
    );
    if !takes_arguments && !numbers.is_empty() {
        return None;
    }
    Some(input)
}

/// Converts player input into an action for the player.
///
/// Returns `None` when an inventory index does not name a carried item, or
/// when an item that must be aimed is used without a target cell.
pub fn input_to_action(input: PlayerInput, engine: &Engine) -> Option<Action> {
    let actor = engine.player_id;
    let carried = |index: usize| {
        let slot = index.checked_sub(1)?;
        engine.player_actor()?.inventory.items().get(slot)
    };
    let item_at = |index: usize| carried(index).map(|item| item.id);

    let kind = match input {
        PlayerInput::Move(delta) => ActionKind::Bump {
            dx: delta.x,
            dy: delta.y,
        },
        PlayerInput::Wait => ActionKind::Wait,
        PlayerInput::PickUp => ActionKind::Pickup,
        PlayerInput::Drop(index) => ActionKind::Drop {
            item: item_at(index)?,
        },
        PlayerInput::Equip(index) => ActionKind::Equip {
            item: item_at(index)?,
        },
        PlayerInput::Use(index, target) => {
            let item = carried(index)?;
            let needs_target = item
                .as_item()
                .and_then(|components| components.consumable)
                .is_some_and(|consumable| consumable.needs_target());
            if needs_target && target.is_none() {
                return None;
            }
            ActionKind::UseItem {
                item: item.id,
                target,
            }
        }
        PlayerInput::Descend => ActionKind::TakeStairs,
        PlayerInput::Quit => ActionKind::Escape,
    };
    Some(Action::new(actor, kind))
}

/// Replays a fixed list of actions, then escapes.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<Action>,
}

impl ScriptedInput {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            queue: actions.into_iter().collect(),
        }
    }

    /// Builds the script from text commands. Lines that do not map to an
    /// action are skipped.
    pub fn from_commands<'a>(engine: &Engine, lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            lines
                .into_iter()
                .filter_map(parse_command)
                .filter_map(|input| input_to_action(input, engine)),
        )
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_action(&mut self, engine: &Engine) -> Action {
        self.queue
            .pop_front()
            .unwrap_or_else(|| Action::escape(engine.player_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{fireball_scroll, health_potion, DungeonParams};

    #[test]
    fn test_parse_movement_keys() {
        assert_eq!(parse_command("h"), Some(PlayerInput::Move(Position::new(-1, 0))));
        assert_eq!(parse_command("  n  "), Some(PlayerInput::Move(Position::new(1, 1))));
        assert_eq!(parse_command("."), Some(PlayerInput::Wait));
        assert_eq!(parse_command("q"), Some(PlayerInput::Quit));
    }

    #[test]
    fn test_parse_inventory_commands() {
        assert_eq!(parse_command("drop 1"), Some(PlayerInput::Drop(1)));
        assert_eq!(parse_command("equip 2"), Some(PlayerInput::Equip(2)));
        assert_eq!(parse_command("use 3"), Some(PlayerInput::Use(3, None)));
        assert_eq!(
            parse_command("use 1 -2 7"),
            Some(PlayerInput::Use(1, Some(Position::new(-2, 7))))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("drop"), None);
        assert_eq!(parse_command("drop 0"), None);
        assert_eq!(parse_command("drop x"), None);
        assert_eq!(parse_command("use 1 2"), None);
        assert_eq!(parse_command("h 3"), None);
    }

    #[test]
    fn test_inventory_index_maps_to_item() {
        let engine = Engine::new_game(DungeonParams::for_testing(), 8).unwrap();
        let first = engine.player_actor().unwrap().inventory.items()[0].id;

        let action = input_to_action(PlayerInput::Equip(1), &engine).unwrap();
        assert_eq!(action.kind, ActionKind::Equip { item: first });
        assert!(input_to_action(PlayerInput::Drop(9), &engine).is_none());
    }

    #[test]
    fn test_aimed_items_require_a_target() {
        let mut engine = Engine::new_game(DungeonParams::for_testing(), 8).unwrap();
        let hero = engine.player_position().unwrap();
        let inventory = &mut engine.player_actor_mut().unwrap().inventory;
        let potion = health_potion(hero);
        let scroll = fireball_scroll(hero);
        let (potion_id, scroll_id) = (potion.id, scroll.id);
        inventory.add(potion).unwrap();
        inventory.add(scroll).unwrap();

        // dagger and armor occupy slots 1 and 2
        let drink = input_to_action(PlayerInput::Use(3, None), &engine).unwrap();
        assert_eq!(
            drink.kind,
            ActionKind::UseItem {
                item: potion_id,
                target: None
            }
        );

        assert!(input_to_action(PlayerInput::Use(4, None), &engine).is_none());
        let aimed = input_to_action(PlayerInput::Use(4, Some(hero)), &engine).unwrap();
        assert_eq!(
            aimed.kind,
            ActionKind::UseItem {
                item: scroll_id,
                target: Some(hero)
            }
        );
    }

    #[test]
    fn test_scripted_input_escapes_when_exhausted() {
        let engine = Engine::new_game(DungeonParams::for_testing(), 8).unwrap();
        let mut input = ScriptedInput::from_commands(&engine, ["l", "bogus", "."]);
        assert_eq!(input.remaining(), 2);

        assert_eq!(input.next_action(&engine).kind, ActionKind::Bump { dx: 1, dy: 0 });
        assert_eq!(input.next_action(&engine).kind, ActionKind::Wait);
        assert_eq!(input.next_action(&engine).kind, ActionKind::Escape);
    }
}
