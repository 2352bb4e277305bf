//! Battle session orchestration.
//!
//! [`BattleSession`] owns everything a running battle needs: the state store,
//! the seeded RNG, the turn controller, the outcome evaluator and the replay
//! recorder. Callers submit actor commands; the session drives turn upkeep
//! (`BeginTurn`/`EndTurn`) itself so every recorded battle has the same shape.
use std::collections::BTreeSet;
use std::time::Duration;

use tactics_core::{
    ActionCommand, ActionResolution, ActionResolver, ActorDefinition, BattleEnv, BattleOutcome,
    BattleState, BeginTurnAction, EndTurnAction, EntityId, OutcomeEvaluator, PcgRng,
    ReplayRecord, ReplayRecorder, TurnController, TurnEndCause, initiative_order,
};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::repository::ReplayRepository;

/// What a caller learns after each session step.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionStep {
    pub resolution: ActionResolution,
    pub outcome: BattleOutcome,
    /// Actor holding the turn after the step.
    pub current_actor: Option<EntityId>,
    pub remaining_actions: u32,
}

pub struct BattleSession<'a> {
    config: SessionConfig,
    resolver: ActionResolver<'a>,
    state: BattleState,
    rng: PcgRng,
    turns: TurnController,
    evaluator: OutcomeEvaluator,
    outcome: BattleOutcome,
    recorder: Option<ReplayRecorder>,
}

impl<'a> BattleSession<'a> {
    /// Builds the battle from `roster` and opens the first turn.
    ///
    /// Initiative follows rapidity (ties to the lower id). Actors that start
    /// defeated never receive a turn.
    pub fn start(
        env: BattleEnv<'a>,
        roster: &[ActorDefinition],
        config: SessionConfig,
    ) -> Result<Self> {
        Self::start_with_evaluator(env, roster, config, OutcomeEvaluator::new())
    }

    /// Like [`Self::start`], with custom objectives.
    pub fn start_with_evaluator(
        env: BattleEnv<'a>,
        roster: &[ActorDefinition],
        config: SessionConfig,
        evaluator: OutcomeEvaluator,
    ) -> Result<Self> {
        if roster.is_empty() {
            return Err(SessionError::EmptyRoster);
        }
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = roster.iter().find(|actor| !seen.insert(actor.id)) {
            return Err(SessionError::DuplicateActor(duplicate.id));
        }

        let state = BattleState::from_roster(roster);
        let order = initiative_order(roster.iter().map(|actor| (actor.id, actor.rapidity)));
        let defeated: Vec<EntityId> = order
            .iter()
            .copied()
            .filter(|id| !state.is_alive(*id))
            .collect();
        let mut turns =
            TurnController::with_inactive(order, config.battle.actions_per_turn, defeated)?;
        if let Some(limit) = config.turn_time_limit() {
            turns = turns.with_time_limit(limit);
        }

        let recorder = config
            .record_replay
            .then(|| ReplayRecorder::start(config.seed, &state));
        let outcome = evaluator.evaluate(&state);

        let mut session = Self {
            rng: PcgRng::new(config.seed),
            resolver: ActionResolver::new(env),
            config,
            state,
            turns,
            evaluator,
            outcome,
            recorder,
        };
        tracing::info!(
            seed = session.config.seed,
            actors = roster.len(),
            order = ?session.turns.order(),
            "battle session started"
        );
        session.open_turn();
        Ok(session)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn turns(&self) -> &TurnController {
        &self.turns
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    pub fn current_actor(&self) -> Option<EntityId> {
        self.turns.current_actor()
    }

    pub fn remaining_actions(&self) -> u32 {
        self.turns.remaining_actions()
    }

    /// The replay recorded so far, when recording is enabled.
    pub fn replay(&self) -> Option<&ReplayRecord> {
        self.recorder.as_ref().map(ReplayRecorder::record_ref)
    }

    pub fn into_replay(self) -> Option<ReplayRecord> {
        self.recorder.map(ReplayRecorder::finish)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Resolves a command from the actor holding the turn.
    ///
    /// Only the current actor may act, and only while budget remains.
    /// Rejected commands are logged and recorded but leave the budget intact.
    pub fn submit(&mut self, command: impl Into<ActionCommand>) -> Result<SessionStep> {
        let command = command.into();
        self.ensure_ongoing()?;
        let actor = command.actor();
        if command.is_system() {
            return Err(SessionError::SystemCommand { actor });
        }
        self.turns.ensure_can_act(actor)?;

        let resolution = self.resolve(&command);
        if !resolution.is_rejected() {
            if self.turns.current_actor() == Some(actor) {
                self.turns.consume_action(actor)?;
            } else {
                // The actor fell to its own command and the turn moved on.
                self.open_turn();
            }
        }
        Ok(self.step(resolution))
    }

    /// Ends the current actor's turn voluntarily.
    pub fn end_turn(&mut self) -> Result<SessionStep> {
        self.finish_turn(TurnEndCause::Voluntary)
    }

    /// Ends the current turn if `elapsed` has reached the time limit.
    pub fn poll_timeout(&mut self, elapsed: Duration) -> Result<Option<SessionStep>> {
        if !self.turns.has_timed_out(elapsed) {
            return Ok(None);
        }
        tracing::warn!(
            actor = ?self.turns.current_actor(),
            elapsed_secs = elapsed.as_secs(),
            "turn timed out"
        );
        self.finish_turn(TurnEndCause::TimedOut).map(Some)
    }

    /// Persists the recorded replay under `id`.
    pub fn save_replay(&self, repository: &dyn ReplayRepository, id: &str) -> Result<()> {
        let record = self.replay().ok_or(SessionError::ReplayDisabled)?;
        repository.save(id, record)?;
        tracing::info!(id, steps = record.len(), "replay saved");
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_ongoing(&self) -> Result<()> {
        if self.outcome.is_battle_over() {
            Err(SessionError::BattleOver(self.outcome))
        } else {
            Ok(())
        }
    }

    fn finish_turn(&mut self, cause: TurnEndCause) -> Result<SessionStep> {
        self.ensure_ongoing()?;
        let actor = self
            .turns
            .current_actor()
            .ok_or(SessionError::NoActiveActor)?;
        let action = match cause {
            TurnEndCause::Voluntary => EndTurnAction::new(actor),
            TurnEndCause::TimedOut => EndTurnAction::timed_out(actor),
        };

        let resolution = self.resolve(&action.into());
        if self.turns.current_actor() == Some(actor) {
            self.turns.end_turn();
        }
        self.open_turn();
        Ok(self.step(resolution))
    }

    /// Runs turn-start upkeep for whoever holds the turn. If upkeep defeats
    /// that actor the turn passes on and the next actor is opened instead.
    fn open_turn(&mut self) {
        while !self.outcome.is_battle_over() {
            let Some(actor) = self.turns.current_actor() else {
                return;
            };
            self.resolve(&BeginTurnAction::new(actor).into());
            if self.turns.current_actor() == Some(actor) {
                tracing::info!(%actor, round = self.turns.round(), "turn started");
                return;
            }
        }
    }

    fn resolve(&mut self, command: &ActionCommand) -> ActionResolution {
        let resolution = self
            .resolver
            .resolve(&mut self.state, &mut self.rng, command);
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(command, &self.state);
        }
        self.retire_defeated();

        let outcome = self.evaluator.evaluate(&self.state);
        if outcome.is_battle_over() && !self.outcome.is_battle_over() {
            tracing::info!(?outcome, tick = %self.state.tick(), "battle over");
        }
        self.outcome = outcome;
        resolution
    }

    fn retire_defeated(&mut self) {
        let fallen: Vec<EntityId> = self
            .turns
            .order()
            .iter()
            .copied()
            .filter(|id| self.turns.is_active(*id) && !self.state.is_alive(*id))
            .collect();
        for actor in fallen {
            tracing::info!(%actor, "actor defeated");
            self.turns.set_active(actor, false);
        }
    }

    fn step(&self, resolution: ActionResolution) -> SessionStep {
        SessionStep {
            resolution,
            outcome: self.outcome,
            current_actor: self.turns.current_actor(),
            remaining_actions: self.turns.remaining_actions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{BasicAttackAction, BattleMap, Position3, TeamId, TurnError};

    fn roster() -> Vec<ActorDefinition> {
        vec![
            ActorDefinition::new(EntityId(1), TeamId(1), Position3::new(0, 0, 0), 20, 3, 4),
            ActorDefinition::new(EntityId(2), TeamId(2), Position3::new(1, 0, 0), 20, 3, 9),
        ]
    }

    #[test]
    fn fastest_actor_opens_with_upkeep_recorded() {
        let map = BattleMap::legacy();
        let session =
            BattleSession::start(BattleEnv::new(&map), &roster(), SessionConfig::new(1)).unwrap();

        assert_eq!(session.current_actor(), Some(EntityId(2)));
        assert_eq!(session.remaining_actions(), 2);
        let replay = session.replay().unwrap();
        assert_eq!(replay.len(), 1);
        assert_eq!(session.state().events().len(), 1);
    }

    #[test]
    fn out_of_turn_and_system_commands_are_errors() {
        let map = BattleMap::legacy();
        let mut session =
            BattleSession::start(BattleEnv::new(&map), &roster(), SessionConfig::new(1)).unwrap();

        let err = session
            .submit(BasicAttackAction::new(EntityId(1), EntityId(2)))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Turn(TurnError::NotCurrentActor { actor }) if actor == EntityId(1)
        ));

        let err = session.submit(BeginTurnAction::new(EntityId(2))).unwrap_err();
        assert!(matches!(err, SessionError::SystemCommand { .. }));
        assert_eq!(session.state().events().len(), 1);
    }

    #[test]
    fn rejected_commands_keep_the_budget() {
        let map = BattleMap::legacy();
        let mut session =
            BattleSession::start(BattleEnv::new(&map), &roster(), SessionConfig::new(1)).unwrap();

        let step = session
            .submit(BasicAttackAction::new(EntityId(2), EntityId(2)))
            .unwrap();
        assert!(step.resolution.is_rejected());
        assert_eq!(step.remaining_actions, 2);
    }

    #[test]
    fn empty_and_duplicate_rosters_fail() {
        let map = BattleMap::legacy();
        let err = BattleSession::start(BattleEnv::new(&map), &[], SessionConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::EmptyRoster));

        let mut twins = roster();
        twins.push(roster()[0].clone());
        let err = BattleSession::start(BattleEnv::new(&map), &twins, SessionConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::DuplicateActor(id) if id == EntityId(1)));
    }
}
