//! Resolution services: hit rolls, critical rolls and damage.
//!
//! These functions are the only consumers of the [`RngService`] during action
//! resolution. Their draw order is part of the replay contract (see
//! [`crate::rng`]).
pub mod damage;
pub mod hit;

pub use damage::{DamageContext, compute_damage};
pub use hit::{basic_hit_chance, critical_chance, skill_hit_chance};

use crate::config::BattleConfig;
use crate::policy::{BasicAttackPolicy, SkillPolicy};
use crate::rng::RngService;
use crate::state::CombatantRpgStats;

/// Rolled result of one strike. `damage` is zero on a miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StrikeOutcome {
    pub hit: bool,
    pub critical: bool,
    pub hit_chance: i32,
    pub hit_roll: i32,
    pub damage: i32,
}

impl StrikeOutcome {
    fn miss(hit_chance: i32, hit_roll: i32) -> Self {
        Self {
            hit: false,
            critical: false,
            hit_chance,
            hit_roll,
            damage: 0,
        }
    }
}

/// Resolves a basic attack.
///
/// Draws the hit roll from `[0, 100)` (hit iff `roll < chance`), then on a hit
/// the damage variance from `[0, DAMAGE_VARIANCE)`. Basic attacks never
/// critically hit.
pub fn resolve_basic_attack(
    policy: &BasicAttackPolicy,
    elevation_delta: i32,
    attacker: Option<&CombatantRpgStats>,
    defender: Option<&CombatantRpgStats>,
    rng: &mut dyn RngService,
) -> StrikeOutcome {
    let hit_chance = basic_hit_chance(policy.base_hit_chance, elevation_delta);
    let hit_roll = rng.next_int(0, 100);
    if hit_roll >= hit_chance {
        return StrikeOutcome::miss(hit_chance, hit_roll);
    }

    let variance = rng.next_int(0, BattleConfig::DAMAGE_VARIANCE);
    let raw = policy
        .base_damage
        .saturating_add(hit::basic_elevation_damage(elevation_delta))
        .saturating_add(variance)
        .max(0);
    let ctx = DamageContext::new(raw, policy.element).with_stats(attacker, defender);

    StrikeOutcome {
        hit: true,
        critical: false,
        hit_chance,
        hit_roll,
        damage: compute_damage(&ctx),
    }
}

/// Resolves a skill strike against its primary target.
///
/// Draws the hit roll from `[1, 101)` (hit iff `roll <= chance`), then on a
/// hit the damage variance and finally the critical roll from `[1, 101)`.
pub fn resolve_skill(
    policy: &SkillPolicy,
    caster: Option<&CombatantRpgStats>,
    target: Option<&CombatantRpgStats>,
    rng: &mut dyn RngService,
) -> StrikeOutcome {
    let hit_chance = skill_hit_chance(policy.hit_chance);
    let hit_roll = rng.next_int(1, 101);
    if hit_roll > hit_chance {
        return StrikeOutcome::miss(hit_chance, hit_roll);
    }

    let variance = rng.next_int(0, BattleConfig::DAMAGE_VARIANCE);
    let crit_chance = critical_chance(
        policy.base_critical_chance,
        caster.map_or(0, |stats| stats.critical_chance),
    );
    let critical = rng.next_int(1, 101) <= crit_chance;
    let raw = policy.base_damage.saturating_add(variance);
    let ctx = DamageContext::new(raw, policy.element)
        .with_critical(critical)
        .with_stats(caster, target);

    StrikeOutcome {
        hit: true,
        critical,
        hit_chance,
        hit_roll,
        damage: compute_damage(&ctx),
    }
}
