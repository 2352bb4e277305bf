pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod map;
pub mod policy;
pub mod replay;
pub mod rng;
pub mod state;
pub mod targeting;

pub use action::{
    ActionCommand, ActionResolution, ActionTransition, BasicAttackAction, BeginTurnAction,
    CastSkillAction, EndTurnAction, FailureReason, MoveAction, Rejection, ResolutionCode,
    ResolutionPayload, TurnEndCause,
};
pub use config::BattleConfig;
pub use engine::{
    ActionResolver, BattleOutcome, ControlPointObjective, ObjectiveStrategy, OutcomeEvaluator,
    TurnController, TurnError, initiative_order,
};
pub use env::BattleEnv;
pub use error::{ErrorSeverity, GameError};
pub use map::{BattleMap, PathfindingError, PathfindingMode};
pub use policy::{
    BasicAttackPolicy, MovePolicy, PeriodicEffectPolicy, SkillPolicy, StatusEffectPolicy,
};
pub use replay::{ReplayError, ReplayRecord, ReplayRecorder, ReplayRun, ReplayRunner, RecordedCommand};
pub use rng::{PcgRng, RngService, ScriptedRng};
pub use state::{
    ActorDefinition, BattleEvent, BattleState, BattleStateSnapshot, CombatantRpgStats,
    DamageElement, ElementVector, EntityId, MovementPoints, Position3, SkillId, StateError,
    StatusEffectKind, StatusEffectState, TeamId, Tick, TickMoment,
};
