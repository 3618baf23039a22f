//! # Turn Scheduler
//!
//! Drives the session one player turn at a time: apply the player's action,
//! let every autonomous actor respond, then refresh visibility.

use crate::game::messages::colors;
use crate::game::{ai, Action, ActionKind, Engine, EntityId, FieldOfView, LineOfSightFov, Turn};
use crate::input::InputSource;
use crate::DelveError;
use log::{debug, trace};

/// Why a session stopped.
#[derive(Debug, thiserror::Error)]
pub enum SessionEnd {
    /// The player chose to leave
    #[error("session ended by the player")]
    Escape,
    /// Something broke that the session cannot recover from
    #[error("session aborted: {0}")]
    Fault(#[from] DelveError),
}

/// Where the scheduler is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    AwaitingControlledAction,
    ResolvingAutonomousActors,
}

/// What happened to a submitted player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReport {
    /// The action succeeded and the world advanced by one turn
    Completed,
    /// The action was impossible; no time passed
    Rejected(String),
}

pub struct TurnScheduler {
    state: SchedulerState,
    fov: Box<dyn FieldOfView>,
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new(Box::new(LineOfSightFov))
    }
}

impl TurnScheduler {
    pub fn new(fov: Box<dyn FieldOfView>) -> Self {
        Self {
            state: SchedulerState::AwaitingControlledAction,
            fov,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn refresh_visibility(&self, engine: &mut Engine) {
        engine.update_fov(self.fov.as_ref());
    }

    /// Submits the player's action for this turn.
    ///
    /// A rejected action is reported (and logged for the player) without
    /// advancing time. `Err` means the session is over.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Action, DungeonParams, Engine, TurnReport, TurnScheduler};
    ///
    /// let mut engine = Engine::new_game(DungeonParams::for_testing(), 3).unwrap();
    /// let mut scheduler = TurnScheduler::default();
    /// let player_id = engine.player_id;
    ///
    /// let report = scheduler.submit(&mut engine, Action::wait(player_id)).unwrap();
    /// assert_eq!(report, TurnReport::Completed);
    /// assert_eq!(engine.turn_number, 1);
    /// ```
    pub fn submit(
        &mut self,
        engine: &mut Engine,
        action: Action,
    ) -> Result<TurnReport, SessionEnd> {
        if action.actor != engine.player_id {
            return Ok(reject(engine, "Only the player can be commanded."));
        }
        if action.kind != ActionKind::Escape && !engine.is_player_alive() {
            return Ok(reject(engine, "You are dead."));
        }

        match action.perform(engine) {
            Err(impossible) => return Ok(reject(engine, impossible.reason())),
            Ok(Turn::EndSession(end)) => return Err(end),
            Ok(Turn::Taken) => {}
        }

        self.state = SchedulerState::ResolvingAutonomousActors;
        self.resolve_autonomous_actors(engine);
        self.refresh_visibility(engine);
        engine.turn_number += 1;
        self.state = SchedulerState::AwaitingControlledAction;

        Ok(TurnReport::Completed)
    }

    /// Lets every living non-player actor take one action. Their failures
    /// are silently dropped.
    fn resolve_autonomous_actors(&mut self, engine: &mut Engine) {
        let actors: Vec<EntityId> = engine
            .level
            .living_actors()
            .map(|entity| entity.id)
            .filter(|&id| id != engine.player_id)
            .collect();

        for id in actors {
            if !engine.level.entity(id).is_some_and(|entity| entity.is_alive()) {
                continue;
            }
            let Some(action) = ai::decide(engine, id) else {
                continue;
            };
            match action.perform(engine) {
                Ok(Turn::Taken) => {}
                Ok(Turn::EndSession(end)) => debug!("Ignoring session end from {}: {}", id, end),
                Err(impossible) => trace!("{} could not act: {}", id, impossible),
            }
        }
    }

    /// Plays until the player escapes or the session faults.
    pub fn run(&mut self, engine: &mut Engine, input: &mut dyn InputSource) -> SessionEnd {
        self.refresh_visibility(engine);
        loop {
            let action = input.next_action(engine);
            if let Err(end) = self.submit(engine, action) {
                return end;
            }
        }
    }
}

fn reject(engine: &mut Engine, reason: &str) -> TurnReport {
    engine.message_log.add_message(reason, colors::IMPOSSIBLE);
    TurnReport::Rejected(reason.to_string())
}
