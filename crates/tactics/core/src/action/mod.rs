//! Action commands.
//!
//! [`ActionCommand`] is the closed set of things that can happen in a battle.
//! Each variant implements [`ActionTransition`]: read-only gates first, then
//! rolls and mutations. Commands never advance the tick or log events; the
//! [`crate::engine::ActionResolver`] does both for every command.
pub mod attack;
pub mod movement;
pub mod resolution;
pub mod skill;
pub mod system;
pub mod transition;

pub use attack::{BasicAttackAction, BasicAttackPlan};
pub use movement::{MoveAction, MovePlan, validate_move};
pub use resolution::{ActionResolution, FailureReason, Rejection, ResolutionCode, ResolutionPayload};
pub use skill::{CastSkillAction, CastSkillPlan};
pub use system::{BeginTurnAction, EndTurnAction, TurnEndCause, UpkeepSummary};
pub use transition::ActionTransition;

use crate::env::BattleEnv;
use crate::rng::RngService;
use crate::state::{BattleState, EntityId};

/// Every command the resolver accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionCommand {
    Move(MoveAction),
    BasicAttack(BasicAttackAction),
    CastSkill(CastSkillAction),
    BeginTurn(BeginTurnAction),
    EndTurn(EndTurnAction),
}

impl ActionCommand {
    /// The entity issuing the command.
    pub fn actor(&self) -> EntityId {
        match self {
            Self::Move(action) => action.actor,
            Self::BasicAttack(action) => action.attacker,
            Self::CastSkill(action) => action.caster,
            Self::BeginTurn(action) => action.actor,
            Self::EndTurn(action) => action.actor,
        }
    }

    /// Turn upkeep rather than a player or AI decision.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::BeginTurn(_) | Self::EndTurn(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::BasicAttack(_) => "basic_attack",
            Self::CastSkill(_) => "cast_skill",
            Self::BeginTurn(_) => "begin_turn",
            Self::EndTurn(_) => "end_turn",
        }
    }

    /// Runs the command's gates and effects against `state`.
    pub fn execute(
        &self,
        state: &mut BattleState,
        env: &BattleEnv<'_>,
        rng: &mut dyn RngService,
    ) -> ActionResolution {
        match self {
            Self::Move(action) => action.execute(state, env, rng),
            Self::BasicAttack(action) => action.execute(state, env, rng),
            Self::CastSkill(action) => action.execute(state, env, rng),
            Self::BeginTurn(action) => action.execute(state, env, rng),
            Self::EndTurn(action) => action.execute(state, env, rng),
        }
    }
}

impl From<MoveAction> for ActionCommand {
    fn from(action: MoveAction) -> Self {
        Self::Move(action)
    }
}

impl From<BasicAttackAction> for ActionCommand {
    fn from(action: BasicAttackAction) -> Self {
        Self::BasicAttack(action)
    }
}

impl From<CastSkillAction> for ActionCommand {
    fn from(action: CastSkillAction) -> Self {
        Self::CastSkill(action)
    }
}

impl From<BeginTurnAction> for ActionCommand {
    fn from(action: BeginTurnAction) -> Self {
        Self::BeginTurn(action)
    }
}

impl From<EndTurnAction> for ActionCommand {
    fn from(action: EndTurnAction) -> Self {
        Self::EndTurn(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::SkillPolicy;
    use crate::state::{Position3, SkillId};

    #[test]
    fn actor_is_taken_from_the_issuing_side() {
        let commands: [ActionCommand; 4] = [
            MoveAction::new(EntityId(1), Position3::ORIGIN, Position3::new(1, 0, 0)).into(),
            BasicAttackAction::new(EntityId(2), EntityId(9)).into(),
            CastSkillAction::new(EntityId(3), EntityId(9), SkillPolicy::new(SkillId(1), 1, 2, 3))
                .into(),
            EndTurnAction::timed_out(EntityId(4)).into(),
        ];
        let actors: Vec<u32> = commands.iter().map(|c| c.actor().0).collect();
        assert_eq!(actors, vec![1, 2, 3, 4]);
        assert!(commands[3].is_system());
        assert_eq!(commands[1].kind(), "basic_attack");
    }
}
