//! Replay recording and verification.
//!
//! A [`ReplayRecord`] holds everything needed to re-run a battle: the seed,
//! the initial snapshot, every resolved command, and the event and snapshot
//! it produced. [`ReplayRunner`] rebuilds a fresh state from the initial snapshot,
//! re-seeds a [`PcgRng`] and re-executes the commands through the same
//! [`ActionResolver`]. With the same seed the replayed snapshots and event
//! codes and descriptions are equal to the recorded ones; with a different
//! seed they are not expected to be.

use crate::action::{
    ActionCommand, ActionResolution, BasicAttackAction, BeginTurnAction, CastSkillAction,
    EndTurnAction, MoveAction, TurnEndCause,
};
use crate::engine::ActionResolver;
use crate::error::{ErrorSeverity, GameError};
use crate::policy::{BasicAttackPolicy, MovePolicy, SkillPolicy};
use crate::rng::PcgRng;
use crate::state::{
    BattleEvent, BattleState, BattleStateSnapshot, EntityId, Position3, StateError,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("replay has {actions} actions but {snapshots} snapshots")]
    LengthMismatch { actions: usize, snapshots: usize },

    #[error("replay has {actions} actions but {events} events")]
    EventCountMismatch { actions: usize, events: usize },

    #[error("invalid replay snapshot: {0}")]
    State(#[from] StateError),

    #[error("replay diverged at step {step}: recorded {recorded}, replayed {replayed}")]
    SnapshotMismatch {
        step: usize,
        recorded: String,
        replayed: String,
    },

    #[error("replay event diverged at step {step}: recorded `{recorded}`, replayed `{replayed}`")]
    EventMismatch {
        step: usize,
        recorded: String,
        replayed: String,
    },
}

impl GameError for ReplayError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::LengthMismatch { .. } | Self::EventCountMismatch { .. } | Self::State(_) => {
                ErrorSeverity::Validation
            }
            Self::SnapshotMismatch { .. } | Self::EventMismatch { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LengthMismatch { .. } => "REPLAY_LENGTH_MISMATCH",
            Self::EventCountMismatch { .. } => "REPLAY_EVENT_COUNT_MISMATCH",
            Self::State(_) => "REPLAY_INVALID_SNAPSHOT",
            Self::SnapshotMismatch { .. } => "REPLAY_DIVERGED",
            Self::EventMismatch { .. } => "REPLAY_EVENT_DIVERGED",
        }
    }
}

/// Wire form of a resolved command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordedCommand {
    Move {
        actor: EntityId,
        origin: Position3,
        destination: Position3,
        policy: Option<MovePolicy>,
    },
    BasicAttack {
        attacker: EntityId,
        target: EntityId,
        policy: Option<BasicAttackPolicy>,
    },
    CastSkill {
        caster: EntityId,
        target: EntityId,
        skill: SkillPolicy,
    },
    BeginTurn {
        actor: EntityId,
    },
    EndTurn {
        actor: EntityId,
        cause: TurnEndCause,
    },
}

impl From<&ActionCommand> for RecordedCommand {
    fn from(command: &ActionCommand) -> Self {
        match *command {
            ActionCommand::Move(action) => Self::Move {
                actor: action.actor,
                origin: action.origin,
                destination: action.destination,
                policy: action.policy,
            },
            ActionCommand::BasicAttack(action) => Self::BasicAttack {
                attacker: action.attacker,
                target: action.target,
                policy: action.policy,
            },
            ActionCommand::CastSkill(action) => Self::CastSkill {
                caster: action.caster,
                target: action.target,
                skill: action.policy,
            },
            ActionCommand::BeginTurn(action) => Self::BeginTurn {
                actor: action.actor,
            },
            ActionCommand::EndTurn(action) => Self::EndTurn {
                actor: action.actor,
                cause: action.cause,
            },
        }
    }
}

impl From<RecordedCommand> for ActionCommand {
    fn from(recorded: RecordedCommand) -> Self {
        match recorded {
            RecordedCommand::Move {
                actor,
                origin,
                destination,
                policy,
            } => Self::Move(MoveAction {
                actor,
                origin,
                destination,
                policy,
            }),
            RecordedCommand::BasicAttack {
                attacker,
                target,
                policy,
            } => Self::BasicAttack(BasicAttackAction {
                attacker,
                target,
                policy,
            }),
            RecordedCommand::CastSkill {
                caster,
                target,
                skill,
            } => Self::CastSkill(CastSkillAction::new(caster, target, skill)),
            RecordedCommand::BeginTurn { actor } => Self::BeginTurn(BeginTurnAction::new(actor)),
            RecordedCommand::EndTurn { actor, cause } => {
                Self::EndTurn(EndTurnAction { actor, cause })
            }
        }
    }
}

/// Everything needed to re-run a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayRecord {
    pub seed: u64,
    pub initial: BattleStateSnapshot,
    pub actions: Vec<RecordedCommand>,
    /// One post-action snapshot per entry of `actions`.
    pub snapshots: Vec<BattleStateSnapshot>,
    /// The event each entry of `actions` appended.
    pub events: Vec<BattleEvent>,
}

impl ReplayRecord {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.actions.len() != self.snapshots.len() {
            return Err(ReplayError::LengthMismatch {
                actions: self.actions.len(),
                snapshots: self.snapshots.len(),
            });
        }
        if self.actions.len() != self.events.len() {
            return Err(ReplayError::EventCountMismatch {
                actions: self.actions.len(),
                events: self.events.len(),
            });
        }
        self.initial.validate()?;
        Ok(())
    }
}

/// Captures a battle as it is played.
#[derive(Clone, Debug)]
pub struct ReplayRecorder {
    record: ReplayRecord,
}

impl ReplayRecorder {
    /// Starts recording from the current state.
    pub fn start(seed: u64, state: &BattleState) -> Self {
        Self {
            record: ReplayRecord {
                seed,
                initial: state.create_snapshot(),
                actions: Vec::new(),
                snapshots: Vec::new(),
                events: Vec::new(),
            },
        }
    }

    /// Appends a resolved command with the state right after it. The command's
    /// event is the last one in the state's log.
    pub fn record(&mut self, command: &ActionCommand, state: &BattleState) {
        self.record.actions.push(RecordedCommand::from(command));
        self.record.snapshots.push(state.create_snapshot());
        if let Some(event) = state.events().last() {
            self.record.events.push(event.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    pub fn record_ref(&self) -> &ReplayRecord {
        &self.record
    }

    pub fn finish(self) -> ReplayRecord {
        self.record
    }
}

/// Output of a replay run.
#[derive(Clone, Debug)]
pub struct ReplayRun {
    pub state: BattleState,
    pub resolutions: Vec<ActionResolution>,
    pub snapshots: Vec<BattleStateSnapshot>,
}

/// Re-executes recorded battles on an isolated state.
#[derive(Clone, Copy, Debug)]
pub struct ReplayRunner<'a> {
    resolver: ActionResolver<'a>,
}

impl<'a> ReplayRunner<'a> {
    pub fn new(resolver: ActionResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Replays `record` with its own seed.
    pub fn run(&self, record: &ReplayRecord) -> Result<ReplayRun, ReplayError> {
        self.run_with_seed(record, record.seed)
    }

    /// Replays `record`'s commands under a different seed.
    pub fn run_with_seed(&self, record: &ReplayRecord, seed: u64) -> Result<ReplayRun, ReplayError> {
        record.validate()?;
        let mut state = BattleState::from_snapshot(&record.initial)?;
        let mut rng = PcgRng::new(seed);

        let mut resolutions = Vec::with_capacity(record.len());
        let mut snapshots = Vec::with_capacity(record.len());
        for recorded in &record.actions {
            let command = ActionCommand::from(*recorded);
            resolutions.push(self.resolver.resolve(&mut state, &mut rng, &command));
            snapshots.push(state.create_snapshot());
        }

        Ok(ReplayRun {
            state,
            resolutions,
            snapshots,
        })
    }

    /// Replays `record` and checks every step's event code and description,
    /// then its snapshot, against the recorded ones.
    ///
    /// Reports the first divergent step. Event divergence carries both
    /// `code: description` lines, snapshot divergence both SHA-256 digests.
    pub fn verify(&self, record: &ReplayRecord) -> Result<ReplayRun, ReplayError> {
        let run = self.run(record)?;
        let steps = record
            .events
            .iter()
            .zip(&run.resolutions)
            .zip(record.snapshots.iter().zip(&run.snapshots));
        for (step, ((event, resolution), (recorded, replayed))) in steps.enumerate() {
            if event.code != resolution.code || event.description != resolution.description {
                tracing::debug!(step, "replay event diverged");
                return Err(ReplayError::EventMismatch {
                    step,
                    recorded: format!("{}: {}", event.code.as_str(), event.description),
                    replayed: format!("{}: {}", resolution.code.as_str(), resolution.description),
                });
            }
            if recorded != replayed {
                tracing::debug!(step, "replay diverged");
                return Err(ReplayError::SnapshotMismatch {
                    step,
                    recorded: hex::encode(recorded.digest()),
                    replayed: hex::encode(replayed.digest()),
                });
            }
        }
        Ok(run)
    }
}
