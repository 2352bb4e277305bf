//! Battle engine: the command resolver, turn order and outcome evaluation.
//!
//! [`ActionResolver`] is the only path through which commands mutate a
//! [`BattleState`]; [`TurnController`] decides who acts next and
//! [`OutcomeEvaluator`] decides when the battle is over.
mod outcome;
mod turns;

use crate::action::{ActionCommand, ActionResolution};
use crate::env::BattleEnv;
use crate::rng::RngService;
use crate::state::{BattleEvent, BattleState};

pub use outcome::{BattleOutcome, ControlPointObjective, ObjectiveStrategy, OutcomeEvaluator};
pub use turns::{TurnController, TurnError, initiative_order};

/// Single entry point through which every command touches the state.
///
/// Resolving a command always appends exactly one event (stamped with the
/// tick at resolution time) and advances the tick by one, whether the command
/// succeeded, missed or was rejected.
#[derive(Clone, Copy, Debug)]
pub struct ActionResolver<'a> {
    env: BattleEnv<'a>,
}

impl<'a> ActionResolver<'a> {
    pub fn new(env: BattleEnv<'a>) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &BattleEnv<'a> {
        &self.env
    }

    pub fn resolve(
        &self,
        state: &mut BattleState,
        rng: &mut dyn RngService,
        command: &ActionCommand,
    ) -> ActionResolution {
        let tick = state.tick();
        let resolution = command.execute(state, &self.env, rng);

        state.push_event(BattleEvent::from_resolution(tick, &resolution));
        state.advance_tick();

        tracing::debug!(
            %tick,
            actor = %command.actor(),
            kind = command.kind(),
            code = resolution.code.as_str(),
            reason = resolution.failure_reason.as_str(),
            "resolved action"
        );
        resolution
    }
}
