use crate::combat::{self, StrikeOutcome};
use crate::env::BattleEnv;
use crate::policy::SkillPolicy;
use crate::rng::RngService;
use crate::state::{BattleState, EntityId, Position3};
use crate::targeting::{SkillTargetReport, evaluate_skill};

use super::{ActionResolution, ActionTransition, FailureReason, Rejection, ResolutionPayload};

/// Casts a skill at a primary target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastSkillAction {
    pub caster: EntityId,
    pub target: EntityId,
    pub policy: SkillPolicy,
}

impl CastSkillAction {
    pub fn new(caster: EntityId, target: EntityId, policy: SkillPolicy) -> Self {
        Self {
            caster,
            target,
            policy,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CastSkillPlan {
    pub geometry: SkillTargetReport,
}

impl ActionTransition for CastSkillAction {
    type Plan = CastSkillPlan;

    fn pre_validate(
        &self,
        state: &BattleState,
        env: &BattleEnv<'_>,
    ) -> Result<CastSkillPlan, Rejection> {
        let policy = &self.policy;
        if !policy.is_valid() {
            return Err(Rejection::new(
                FailureReason::InvalidPolicy,
                format!("{} policy is inconsistent", policy.skill_id),
            ));
        }
        if !state.is_alive(self.caster) {
            return Err(Rejection::new(
                FailureReason::ActorDefeated,
                format!("{} is defeated", self.caster),
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

        let remaining = state.cooldown(self.caster, policy.skill_id);
        if remaining > 0 {
            return Err(Rejection::new(
                FailureReason::SkillOnCooldown,
                format!("{} is on cooldown for {remaining} turns", policy.skill_id),
            )
            .with_payload(ResolutionPayload::single(
                "cooldown",
                i32::try_from(remaining).unwrap_or(i32::MAX),
            )));
        }

        if policy.resource_cost > 0 {
            let available = state.skill_resource(self.caster).unwrap_or(0);
            if available < policy.resource_cost {
                return Err(Rejection::new(
                    FailureReason::SkillResourceInsufficient,
                    format!(
                        "{} needs {} resource, {} has {available}",
                        policy.skill_id, policy.resource_cost, self.caster
                    ),
                )
                .with_payload(ResolutionPayload::new(
                    "resource",
                    available,
                    policy.resource_cost,
                    0,
                )));
            }
        }

        let geometry = evaluate_skill(state, env.map(), self.caster, self.target, policy)?;
        Ok(CastSkillPlan { geometry })
    }

    fn apply(
        &self,
        plan: CastSkillPlan,
        state: &mut BattleState,
        _env: &BattleEnv<'_>,
        rng: &mut dyn RngService,
    ) -> ActionResolution {
        let policy = &self.policy;
        let outcome = combat::resolve_skill(
            policy,
            state.stats(self.caster),
            state.stats(self.target),
            rng,
        );

        if !outcome.hit {
            if let Err(rejection) = self.commit_costs(state) {
                return rejection.into();
            }
            return ActionResolution::missed(format!(
                "{} from {} missed {} (rolled {} against {})",
                policy.skill_id, self.caster, self.target, outcome.hit_roll, outcome.hit_chance
            ))
            .with_payload(ResolutionPayload::new(
                "hit_roll",
                outcome.hit_roll,
                outcome.hit_chance,
                0,
            ));
        }

        if let Err(error) = state.apply_damage(self.target, outcome.damage) {
            return ActionResolution::rejected(
                FailureReason::DamageApplicationFailed,
                error.to_string(),
            );
        }
        let splash_hits = self.apply_splash(state, plan.geometry.target_position, &outcome);

        if let Err(rejection) = self.commit_costs(state) {
            return rejection.into();
        }
        self.apply_statuses(state);

        ActionResolution::succeeded(format!(
            "{} from {} hit {} for {} damage{}",
            policy.skill_id,
            self.caster,
            self.target,
            outcome.damage,
            if outcome.critical { " (critical)" } else { "" }
        ))
        .with_payload(ResolutionPayload::new(
            "skill_damage",
            outcome.damage,
            splash_hits,
            i32::from(outcome.critical),
        ))
    }
}

impl CastSkillAction {
    /// Damages every other living entity within the splash radius of the
    /// primary target, in ascending id order. Returns the number of hits.
    fn apply_splash(
        &self,
        state: &mut BattleState,
        center: Position3,
        outcome: &StrikeOutcome,
    ) -> i32 {
        let policy = &self.policy;
        if policy.splash_radius == 0 || policy.splash_damage_percent <= 0 {
            return 0;
        }
        let splash_damage = i64::from(outcome.damage) * i64::from(policy.splash_damage_percent) / 100;
        let splash_damage = i32::try_from(splash_damage).unwrap_or(i32::MAX);
        if splash_damage <= 0 {
            return 0;
        }

        let victims: Vec<EntityId> = state
            .living_entities()
            .into_iter()
            .filter(|id| *id != self.target)
            .filter(|id| {
                state
                    .position(*id)
                    .is_some_and(|position| position.planar_distance(center) <= policy.splash_radius)
            })
            .collect();

        let mut hits = 0;
        for victim in victims {
            if state.apply_damage(victim, splash_damage).is_ok() {
                hits += 1;
            }
        }
        hits
    }

    /// Consumes the resource and starts the cooldown.
    ///
    /// Damage has already been applied when this runs after a hit, so a
    /// failure here leaves that damage in place and is reported as such.
    fn commit_costs(&self, state: &mut BattleState) -> Result<(), Rejection> {
        let policy = &self.policy;
        if let Err(error) = state.consume_skill_resource(self.caster, policy.resource_cost) {
            tracing::warn!(
                caster = %self.caster,
                skill = %policy.skill_id,
                %error,
                "skill resource could not be committed after resolution"
            );
            return Err(Rejection::new(FailureReason::SkillResourceInsufficient, error.to_string())
                .with_payload(ResolutionPayload::new(
                    "resource_commit_failed",
                    state.skill_resource(self.caster).unwrap_or(0),
                    policy.resource_cost,
                    0,
                )));
        }
        state.set_cooldown(self.caster, policy.skill_id, policy.cooldown_turns);
        Ok(())
    }

    fn apply_statuses(&self, state: &mut BattleState) {
        let policy = &self.policy;
        if let Some(periodic) = policy.periodic_effect {
            if periodic.duration_turns > 0 {
                state.apply_status(self.target, periodic.kind, periodic.to_state());
            }
        }
        if let Some(status) = policy.target_status {
            if status.duration_turns > 0 {
                state.apply_status(self.target, status.kind, status.to_state());
            }
        }
        if let Some(status) = policy.caster_status {
            if status.duration_turns > 0 {
                state.apply_status(self.caster, status.kind, status.to_state());
            }
        }
    }
}
