//! Status effects and skill cooldowns.
//!
//! Both are keyed by a composite value key and stored in hash maps inside
//! [`crate::BattleState`]. Iteration order of those maps is never observed:
//! snapshots sort by key before exporting.
//!
//! # Turn-based Duration
//!
//! Durations count the affected actor's own turns. A status ticks once at the
//! [`TickMoment`] it was applied with, and is removed as soon as its remaining
//! turns reach zero.

use strum::{EnumIter, IntoStaticStr};

use super::common::{EntityId, SkillId};

/// Types of status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatusEffectKind {
    // ========================================================================
    // Periodic (resolved on their tick moment)
    // ========================================================================
    /// Loses `potency` hit points per tick.
    Poison,

    /// Loses `potency` hit points per tick.
    Burn,

    /// Loses `potency` hit points per tick.
    Bleed,

    /// Recovers `potency` hit points per tick, up to maximum.
    Regeneration,

    // ========================================================================
    // Modifiers (bookkeeping only, read by collaborators)
    // ========================================================================
    Stun,
    Slow,
    Weaken,
    Shield,
    Haste,
}

impl StatusEffectKind {
    /// True for kinds that deal damage on every tick.
    pub const fn is_damaging(self) -> bool {
        matches!(self, Self::Poison | Self::Burn | Self::Bleed)
    }

    /// True for kinds that restore hit points on every tick.
    pub const fn is_restorative(self) -> bool {
        matches!(self, Self::Regeneration)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// When a status effect resolves within its owner's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TickMoment {
    #[default]
    TurnStart,
    TurnEnd,
}

/// Live status effect on one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectState {
    pub remaining_turns: u32,
    pub potency: i32,
    pub tick_moment: TickMoment,
}

impl StatusEffectState {
    pub fn new(remaining_turns: u32, potency: i32, tick_moment: TickMoment) -> Self {
        Self {
            remaining_turns,
            potency,
            tick_moment,
        }
    }
}

/// Composite key of a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusKey {
    pub entity: EntityId,
    pub kind: StatusEffectKind,
}

impl StatusKey {
    pub fn new(entity: EntityId, kind: StatusEffectKind) -> Self {
        Self { entity, kind }
    }
}

/// Composite key of a skill cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownKey {
    pub entity: EntityId,
    pub skill: SkillId,
}

impl CooldownKey {
    pub fn new(entity: EntityId, skill: SkillId) -> Self {
        Self { entity, skill }
    }
}
