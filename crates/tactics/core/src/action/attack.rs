use crate::combat;
use crate::env::BattleEnv;
use crate::policy::BasicAttackPolicy;
use crate::rng::RngService;
use crate::state::{BattleState, EntityId};
use crate::targeting::{BasicTargetReport, evaluate_basic_attack};

use super::{ActionResolution, ActionTransition, FailureReason, Rejection, ResolutionPayload};

/// Weapon strike against a single target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasicAttackAction {
    pub attacker: EntityId,
    pub target: EntityId,
    /// Overrides the battle's default basic attack policy.
    pub policy: Option<BasicAttackPolicy>,
}

impl BasicAttackAction {
    pub fn new(attacker: EntityId, target: EntityId) -> Self {
        Self {
            attacker,
            target,
            policy: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: BasicAttackPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BasicAttackPlan {
    pub policy: BasicAttackPolicy,
    pub geometry: BasicTargetReport,
}

impl ActionTransition for BasicAttackAction {
    type Plan = BasicAttackPlan;

    fn pre_validate(
        &self,
        state: &BattleState,
        env: &BattleEnv<'_>,
    ) -> Result<BasicAttackPlan, Rejection> {
        if self.attacker == self.target {
            return Err(Rejection::new(
                FailureReason::SelfTargeting,
                format!("{} cannot attack itself", self.attacker),
            ));
        }
        let policy = env.resolve_basic_attack_policy(self.policy);
        if !policy.is_valid() {
            return Err(Rejection::new(
                FailureReason::InvalidPolicy,
                "basic attack policy is inconsistent",
            ));
        }
        if !state.is_alive(self.attacker) {
            return Err(Rejection::new(
                FailureReason::ActorDefeated,
                format!("{} is defeated", self.attacker),
            ));
        }
        match state.hit_points(self.target) {
            None => {
                return Err(Rejection::new(
                    FailureReason::MissingHitPoints,
                    format!("{} has no hit points", self.target),
                ));
            }
            Some(hp) if hp <= 0 => {
                return Err(Rejection::new(
                    FailureReason::TargetDefeated,
                    format!("{} is already defeated", self.target),
                ));
            }
            Some(_) => {}
        }

        let geometry = evaluate_basic_attack(state, env.map(), self.attacker, self.target, &policy)?;
        Ok(BasicAttackPlan { policy, geometry })
    }

    fn apply(
        &self,
        plan: BasicAttackPlan,
        state: &mut BattleState,
        _env: &BattleEnv<'_>,
        rng: &mut dyn RngService,
    ) -> ActionResolution {
        let outcome = combat::resolve_basic_attack(
            &plan.policy,
            plan.geometry.elevation_delta,
            state.stats(self.attacker),
            state.stats(self.target),
            rng,
        );
        if !outcome.hit {
            return ActionResolution::missed(format!(
                "{} missed {} (rolled {} against {})",
                self.attacker, self.target, outcome.hit_roll, outcome.hit_chance
            ))
            .with_payload(ResolutionPayload::new(
                "hit_roll",
                outcome.hit_roll,
                outcome.hit_chance,
                0,
            ));
        }

        match state.apply_damage(self.target, outcome.damage) {
            Ok(remaining) => ActionResolution::succeeded(format!(
                "{} hit {} for {} damage",
                self.attacker, self.target, outcome.damage
            ))
            .with_payload(ResolutionPayload::new("damage", outcome.damage, remaining, 0)),
            Err(error) => ActionResolution::rejected(
                FailureReason::DamageApplicationFailed,
                error.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::BattleMap;
    use crate::rng::ScriptedRng;
    use crate::state::{ActorDefinition, Position3, TeamId};

    fn duel() -> BattleState {
        BattleState::from_roster(&[
            ActorDefinition::new(EntityId(1), TeamId(1), Position3::new(0, 0, 0), 20, 3, 5),
            ActorDefinition::new(EntityId(2), TeamId(2), Position3::new(1, 0, 0), 20, 3, 5),
        ])
    }

    fn strike(state: &mut BattleState, action: BasicAttackAction, rolls: &[i32]) -> ActionResolution {
        let map = BattleMap::legacy();
        let env = BattleEnv::new(&map);
        action.execute(state, &env, &mut ScriptedRng::new(rolls.iter().copied()))
    }

    #[test]
    fn hit_applies_damage() {
        let mut state = duel();
        let resolution = strike(&mut state, BasicAttackAction::new(EntityId(1), EntityId(2)), &[10, 2]);
        assert!(resolution.success);
        assert_eq!(state.hit_points(EntityId(2)), Some(13));
        assert_eq!(resolution.payload_value(1), Some(7));
    }

    #[test]
    fn miss_leaves_hit_points() {
        let mut state = duel();
        let resolution = strike(&mut state, BasicAttackAction::new(EntityId(1), EntityId(2)), &[90]);
        assert_eq!(resolution.code, crate::action::ResolutionCode::Missed);
        assert_eq!(state.hit_points(EntityId(2)), Some(20));
    }

    #[test]
    fn gates_are_checked_in_order() {
        let mut state = duel();
        let broken = BasicAttackPolicy {
            base_hit_chance: 200,
            ..BasicAttackPolicy::default()
        };

        let selfie = strike(
            &mut state,
            BasicAttackAction::new(EntityId(1), EntityId(1)).with_policy(broken),
            &[],
        );
        assert_eq!(selfie.failure_reason, FailureReason::SelfTargeting);

        state.set_hit_points(EntityId(1), 0);
        let invalid = strike(
            &mut state,
            BasicAttackAction::new(EntityId(1), EntityId(2)).with_policy(broken),
            &[],
        );
        assert_eq!(invalid.failure_reason, FailureReason::InvalidPolicy);

        let defeated = strike(&mut state, BasicAttackAction::new(EntityId(1), EntityId(2)), &[]);
        assert_eq!(defeated.failure_reason, FailureReason::ActorDefeated);

        state.set_hit_points(EntityId(1), 20);
        state.remove_hit_points(EntityId(2));
        let missing = strike(&mut state, BasicAttackAction::new(EntityId(1), EntityId(2)), &[]);
        assert_eq!(missing.failure_reason, FailureReason::MissingHitPoints);

        state.set_hit_points(EntityId(2), 0);
        let dead = strike(&mut state, BasicAttackAction::new(EntityId(1), EntityId(2)), &[]);
        assert_eq!(dead.failure_reason, FailureReason::TargetDefeated);
        assert_eq!(state.hit_points(EntityId(2)), Some(0));
    }

    #[test]
    fn rejection_consumes_no_rolls() {
        let mut state = duel();
        let map = BattleMap::legacy();
        let env = BattleEnv::new(&map);
        let mut rng = ScriptedRng::new([10, 2]);
        let far = BasicAttackAction::new(EntityId(1), EntityId(2)).with_policy(BasicAttackPolicy {
            min_range: 2,
            max_range: 3,
            ..BasicAttackPolicy::default()
        });
        let resolution = far.execute(&mut state, &env, &mut rng);
        assert_eq!(resolution.failure_reason, FailureReason::TooClose);
        assert_eq!(rng.remaining(), 2);
    }
}
