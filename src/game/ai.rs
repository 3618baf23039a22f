//! # Monster AI
//!
//! Turns an actor's AI marker into the action it takes this turn.

use crate::game::messages::colors;
use crate::game::{Action, AiKind, Direction, Engine, EntityId};
use crate::utils::find_path;
use rand::seq::SliceRandom;

/// Picks the next action of an autonomous actor.
///
/// Returns `None` for controlled or dead actors. May update the actor's AI
/// state (stored path, confusion countdown).
pub fn decide(engine: &mut Engine, actor_id: EntityId) -> Option<Action> {
    let ai = engine.actor(actor_id)?.ai.clone()?;

    match ai {
        AiKind::Controlled => None,
        AiKind::Hostile { .. } => Some(hunt(engine, actor_id)),
        AiKind::Confused {
            previous,
            turns_remaining,
        } => Some(stumble(engine, actor_id, *previous, turns_remaining)),
    }
}

/// Attack the player when adjacent and in view, otherwise walk toward them.
fn hunt(engine: &mut Engine, actor_id: EntityId) -> Action {
    let (Some(position), Some(player_position)) = (
        engine.level.entity(actor_id).map(|entity| entity.position),
        engine.player_position(),
    ) else {
        return Action::wait(actor_id);
    };

    if engine.level.is_visible(position) {
        let delta = player_position - position;
        if position.chebyshev_distance(player_position) <= 1 {
            return Action::melee(actor_id, delta.x, delta.y);
        }

        let fresh_path = find_path(&engine.level, position, player_position).unwrap_or_default();
        let ai = engine.actor_mut(actor_id).and_then(|actor| actor.ai.as_mut());
        if let Some(AiKind::Hostile { path }) = ai {
            *path = fresh_path;
        }
    }

    let next_step = match engine.actor_mut(actor_id).and_then(|actor| actor.ai.as_mut()) {
        Some(AiKind::Hostile { path }) if !path.is_empty() => Some(path.remove(0)),
        _ => None,
    };

    match next_step {
        Some(step) => {
            let delta = step - position;
            Action::movement(actor_id, delta.x, delta.y)
        }
        None => Action::wait(actor_id),
    }
}

/// Bump in a random direction until the confusion wears off.
fn stumble(
    engine: &mut Engine,
    actor_id: EntityId,
    previous: AiKind,
    turns_remaining: u32,
) -> Action {
    if turns_remaining == 0 {
        let name = engine
            .level
            .entity(actor_id)
            .map(|entity| entity.name.clone())
            .unwrap_or_default();
        engine
            .message_log
            .add_message(format!("The {} is no longer confused.", name), colors::WHITE);
        if let Some(actor) = engine.actor_mut(actor_id) {
            actor.ai = Some(previous);
        }
        return Action::wait(actor_id);
    }

    let direction = Direction::all()
        .choose(&mut engine.rng)
        .copied()
        .unwrap_or(Direction::North);

    if let Some(actor) = engine.actor_mut(actor_id) {
        actor.ai = Some(AiKind::Confused {
            previous: Box::new(previous),
            turns_remaining: turns_remaining - 1,
        });
    }

    let delta = direction.to_delta();
    Action::bump(actor_id, delta.x, delta.y)
}
