//! Turn upkeep commands.
//!
//! Turn boundaries go through the same pipeline as player actions so that
//! status ticks, movement refills and cooldown countdowns are logged, advance
//! the tick and are captured by replays.

use crate::env::BattleEnv;
use crate::rng::RngService;
use crate::state::{BattleState, EntityId, TickMoment};

use super::{ActionResolution, ActionTransition, FailureReason, Rejection, ResolutionPayload};

/// Why a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnEndCause {
    #[default]
    Voluntary,
    TimedOut,
}

/// Opens an actor's turn: refills movement points and ticks turn-start
/// status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeginTurnAction {
    pub actor: EntityId,
}

impl BeginTurnAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }
}

/// Closes an actor's turn: ticks turn-end status effects and counts down the
/// actor's cooldowns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurnAction {
    pub actor: EntityId,
    pub cause: TurnEndCause,
}

impl EndTurnAction {
    pub fn new(actor: EntityId) -> Self {
        Self {
            actor,
            cause: TurnEndCause::Voluntary,
        }
    }

    pub fn timed_out(actor: EntityId) -> Self {
        Self {
            actor,
            cause: TurnEndCause::TimedOut,
        }
    }
}

/// Totals of one status tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpkeepSummary {
    pub damage: i32,
    pub healing: i32,
    pub expired: i32,
}

impl UpkeepSummary {
    fn payload(self) -> ResolutionPayload {
        ResolutionPayload::new("upkeep", self.damage, self.healing, self.expired)
    }
}

/// Ticks every status effect of `actor` scheduled for `moment`.
///
/// Damaging kinds deal their potency, restorative kinds heal it (capped at the
/// actor's maximum hit points when stats are known). Every ticked effect then
/// loses one remaining turn.
pub(crate) fn tick_statuses(
    state: &mut BattleState,
    actor: EntityId,
    moment: TickMoment,
) -> UpkeepSummary {
    let mut summary = UpkeepSummary::default();
    let maximum = state
        .stats(actor)
        .map(|stats| stats.hit_points)
        .filter(|max| *max > 0);

    for (kind, effect) in state.status_effects_of(actor) {
        if effect.tick_moment != moment {
            continue;
        }
        let potency = effect.potency.max(0);
        if kind.is_damaging() {
            if let Some(before) = state.hit_points(actor) {
                if let Ok(after) = state.apply_damage(actor, potency) {
                    summary.damage += before - after;
                }
            }
        } else if kind.is_restorative() {
            if let Some(before) = state.hit_points(actor).filter(|hp| *hp > 0) {
                if let Ok(after) = state.heal(actor, potency, maximum) {
                    summary.healing += after - before;
                }
            }
        }
        if state.decrement_status(actor, kind) == 0 {
            summary.expired += 1;
        }
    }
    summary
}

impl ActionTransition for BeginTurnAction {
    type Plan = ();

    fn pre_validate(&self, state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), Rejection> {
        if !state.is_alive(self.actor) {
            return Err(Rejection::new(
                FailureReason::ActorDefeated,
                format!("{} is defeated and cannot start a turn", self.actor),
            ));
        }
        Ok(())
    }

    fn apply(
        &self,
        _plan: (),
        state: &mut BattleState,
        _env: &BattleEnv<'_>,
        _rng: &mut dyn RngService,
    ) -> ActionResolution {
        state.refill_movement_points(self.actor);
        let summary = tick_statuses(state, self.actor, TickMoment::TurnStart);
        ActionResolution::succeeded(format!("{} begins its turn", self.actor))
            .with_payload(summary.payload())
    }
}

impl ActionTransition for EndTurnAction {
    type Plan = ();

    fn pre_validate(&self, _state: &BattleState, _env: &BattleEnv<'_>) -> Result<(), Rejection> {
        Ok(())
    }

    fn apply(
        &self,
        _plan: (),
        state: &mut BattleState,
        _env: &BattleEnv<'_>,
        _rng: &mut dyn RngService,
    ) -> ActionResolution {
        let summary = tick_statuses(state, self.actor, TickMoment::TurnEnd);
        state.decrement_cooldowns(self.actor);

        let resolution = match self.cause {
            TurnEndCause::Voluntary => {
                ActionResolution::succeeded(format!("{} ends its turn", self.actor))
            }
            TurnEndCause::TimedOut => ActionResolution::rejected(
                FailureReason::TurnTimedOut,
                format!("{} ran out of time", self.actor),
            ),
        };
        resolution.with_payload(summary.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::BattleMap;
    use crate::rng::ScriptedRng;
    use crate::state::{
        ActorDefinition, CombatantRpgStats, Position3, SkillId, StatusEffectKind,
        StatusEffectState, TeamId,
    };

    fn run(state: &mut BattleState, action: &impl ActionTransition) -> ActionResolution {
        let map = BattleMap::legacy();
        let env = BattleEnv::new(&map);
        action.execute(state, &env, &mut ScriptedRng::new([]))
    }

    fn hero() -> BattleState {
        BattleState::from_roster(&[ActorDefinition::new(
            EntityId(1),
            TeamId(1),
            Position3::ORIGIN,
            20,
            4,
            5,
        )
        .with_stats(CombatantRpgStats {
            hit_points: 22,
            ..CombatantRpgStats::NEUTRAL
        })])
    }

    #[test]
    fn begin_turn_refills_and_ticks_poison() {
        let mut state = hero();
        state.spend_movement_points(EntityId(1), 3).unwrap();
        state.apply_status(
            EntityId(1),
            StatusEffectKind::Poison,
            StatusEffectState::new(1, 3, TickMoment::TurnStart),
        );

        let resolution = run(&mut state, &BeginTurnAction::new(EntityId(1)));
        assert!(resolution.success);
        assert_eq!(state.movement_points(EntityId(1)).map(|mp| mp.current), Some(4));
        assert_eq!(state.hit_points(EntityId(1)), Some(17));
        assert!(state.status_effect(EntityId(1), StatusEffectKind::Poison).is_none());
        assert_eq!(resolution.payload_value(1), Some(3));
        assert_eq!(resolution.payload_value(3), Some(1));
    }

    #[test]
    fn regeneration_is_capped_at_max_hit_points() {
        let mut state = hero();
        state.apply_status(
            EntityId(1),
            StatusEffectKind::Regeneration,
            StatusEffectState::new(2, 5, TickMoment::TurnEnd),
        );
        let resolution = run(&mut state, &EndTurnAction::new(EntityId(1)));
        assert_eq!(state.hit_points(EntityId(1)), Some(22));
        assert_eq!(resolution.payload_value(2), Some(2));
        assert_eq!(
            state
                .status_effect(EntityId(1), StatusEffectKind::Regeneration)
                .map(|s| s.remaining_turns),
            Some(1)
        );
    }

    #[test]
    fn end_turn_counts_down_cooldowns() {
        let mut state = hero();
        state.set_cooldown(EntityId(1), SkillId(3), 2);
        run(&mut state, &EndTurnAction::new(EntityId(1)));
        assert_eq!(state.cooldown(EntityId(1), SkillId(3)), 1);
        run(&mut state, &EndTurnAction::new(EntityId(1)));
        assert_eq!(state.cooldown(EntityId(1), SkillId(3)), 0);
    }

    #[test]
    fn timed_out_turn_is_flagged_but_still_upkept() {
        let mut state = hero();
        state.set_cooldown(EntityId(1), SkillId(3), 1);
        let resolution = run(&mut state, &EndTurnAction::timed_out(EntityId(1)));
        assert_eq!(resolution.failure_reason, FailureReason::TurnTimedOut);
        assert!(resolution.is_rejected());
        assert_eq!(state.cooldown(EntityId(1), SkillId(3)), 0);
    }

    #[test]
    fn defeated_actor_cannot_begin_turn() {
        let mut state = hero();
        state.set_hit_points(EntityId(1), 0);
        let resolution = run(&mut state, &BeginTurnAction::new(EntityId(1)));
        assert_eq!(resolution.failure_reason, FailureReason::ActorDefeated);
    }
}
