//! Rule parameter bundles consumed by the action commands.
//!
//! Policies are immutable value objects built once by the configuration layer
//! (archetype and skill assets) and passed by value into the core. The core
//! never parses assets. It only checks that a policy is internally consistent
//! before using it; an inconsistent policy rejects the action with
//! [`crate::FailureReason::InvalidPolicy`].

use crate::state::{DamageElement, SkillId, StatusEffectKind, StatusEffectState, TickMoment};

/// Movement rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovePolicy {
    /// Maximum total path cost of one move.
    pub max_cost: u32,
    /// Maximum elevation change, per step and for the whole move.
    pub max_vertical_step: i32,
    /// Extra cost per unit of elevation change on a step.
    pub vertical_step_cost: u32,
}

impl MovePolicy {
    pub fn new(max_cost: u32, max_vertical_step: i32, vertical_step_cost: u32) -> Self {
        Self {
            max_cost,
            max_vertical_step,
            vertical_step_cost,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.max_cost > 0 && self.max_vertical_step >= 0
    }
}

impl Default for MovePolicy {
    fn default() -> Self {
        Self::new(3, 1, 1)
    }
}

/// Basic attack rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasicAttackPolicy {
    pub min_range: u32,
    pub max_range: u32,
    /// Largest elevation difference a line of sight may span.
    pub max_line_of_sight_delta: u32,
    /// Hit chance in percent before elevation adjustments.
    pub base_hit_chance: i32,
    pub base_damage: i32,
    pub element: DamageElement,
}

impl BasicAttackPolicy {
    pub fn melee(base_damage: i32) -> Self {
        Self {
            min_range: 1,
            max_range: 1,
            max_line_of_sight_delta: 2,
            base_hit_chance: 75,
            base_damage,
            element: DamageElement::Physical,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.max_range >= self.min_range
            && self.max_range > 0
            && (0..=100).contains(&self.base_hit_chance)
            && self.base_damage >= 0
    }
}

impl Default for BasicAttackPolicy {
    fn default() -> Self {
        Self::melee(5)
    }
}

/// Damage-over-time (or heal-over-time) applied to the primary target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodicEffectPolicy {
    pub kind: StatusEffectKind,
    pub potency: i32,
    pub duration_turns: u32,
    pub tick_moment: TickMoment,
}

impl PeriodicEffectPolicy {
    pub fn poison(potency: i32, duration_turns: u32) -> Self {
        Self {
            kind: StatusEffectKind::Poison,
            potency,
            duration_turns,
            tick_moment: TickMoment::TurnStart,
        }
    }

    pub fn to_state(self) -> StatusEffectState {
        StatusEffectState::new(self.duration_turns, self.potency, self.tick_moment)
    }
}

/// Generic timed status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectPolicy {
    pub kind: StatusEffectKind,
    pub potency: i32,
    pub duration_turns: u32,
    pub tick_moment: TickMoment,
}

impl StatusEffectPolicy {
    pub fn new(kind: StatusEffectKind, potency: i32, duration_turns: u32) -> Self {
        Self {
            kind,
            potency,
            duration_turns,
            tick_moment: TickMoment::TurnEnd,
        }
    }

    pub fn to_state(self) -> StatusEffectState {
        StatusEffectState::new(self.duration_turns, self.potency, self.tick_moment)
    }
}

/// Skill rules, including range, damage, costs and side effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillPolicy {
    pub skill_id: SkillId,
    pub min_range: u32,
    pub max_range: u32,
    /// Caster elevation needed per range bonus step; zero disables the bonus.
    pub elevation_per_range_bonus: i32,
    pub range_bonus_per_elevation_step: i32,
    pub requires_line_of_sight: bool,
    pub allows_self_target: bool,
    pub hit_chance: i32,
    pub base_damage: i32,
    pub element: DamageElement,
    pub base_critical_chance: i32,
    pub resource_cost: i32,
    pub cooldown_turns: u32,
    /// Planar manhattan radius around the primary target; zero disables splash.
    pub splash_radius: u32,
    pub splash_damage_percent: i32,
    pub periodic_effect: Option<PeriodicEffectPolicy>,
    pub target_status: Option<StatusEffectPolicy>,
    pub caster_status: Option<StatusEffectPolicy>,
}

impl SkillPolicy {
    /// Single-target skill with no costs or side effects.
    pub fn new(skill_id: SkillId, min_range: u32, max_range: u32, base_damage: i32) -> Self {
        Self {
            skill_id,
            min_range,
            max_range,
            elevation_per_range_bonus: 0,
            range_bonus_per_elevation_step: 0,
            requires_line_of_sight: true,
            allows_self_target: false,
            hit_chance: 100,
            base_damage,
            element: DamageElement::Physical,
            base_critical_chance: 0,
            resource_cost: 0,
            cooldown_turns: 0,
            splash_radius: 0,
            splash_damage_percent: 0,
            periodic_effect: None,
            target_status: None,
            caster_status: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.max_range >= self.min_range
            && self.elevation_per_range_bonus >= 0
            && self.range_bonus_per_elevation_step >= 0
            && self.base_damage >= 0
            && self.resource_cost >= 0
            && self.splash_damage_percent >= 0
    }
}
