//! Combatant RPG statistics.
//!
//! Stats are an immutable value bundle supplied with the roster. The core
//! reads them during resolution and carries them through snapshots but never
//! modifies them.

use strum::{EnumCount, EnumIter, IntoStaticStr};

/// Damage element. Each element has its own attack, power, defense and
/// resistance value on a combatant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, EnumCount, EnumIter, IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DamageElement {
    Blunt,
    #[default]
    Physical,
    Piercing,
    Explosive,
    Elemental,
    Spiritual,
}

impl DamageElement {
    /// Stable index into an [`ElementVector`].
    pub const fn index(self) -> usize {
        match self {
            Self::Blunt => 0,
            Self::Physical => 1,
            Self::Piercing => 2,
            Self::Explosive => 3,
            Self::Elemental => 4,
            Self::Spiritual => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One integer per [`DamageElement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementVector(pub [i32; DamageElement::COUNT]);

impl ElementVector {
    pub const ZERO: Self = Self([0; DamageElement::COUNT]);

    /// Same value for every element.
    pub const fn uniform(value: i32) -> Self {
        Self([value; DamageElement::COUNT])
    }

    pub fn get(&self, element: DamageElement) -> i32 {
        self.0[element.index()]
    }

    /// Returns a copy with one element replaced (builder pattern).
    #[must_use]
    pub fn with(mut self, element: DamageElement, value: i32) -> Self {
        self.0[element.index()] = value;
        self
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

/// Immutable statistics of a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantRpgStats {
    pub action_points: i32,
    pub movement_points: i32,
    pub range: i32,
    pub elevation: i32,
    pub summon_capacity: i32,
    /// Maximum hit points.
    pub hit_points: i32,
    pub assiduity: i32,
    /// Initiative key: higher acts earlier.
    pub rapidity: i32,
    /// Percent added to a skill's base critical chance.
    pub critical_chance: i32,
    /// Percent added to the base critical multiplier.
    pub critical_damage: i32,
    /// Percent removed from an incoming critical multiplier.
    pub critical_resistance: i32,
    /// Flat damage added per element.
    pub attack: ElementVector,
    /// Damage scaling per element, in percent (100 = unchanged).
    pub power: ElementVector,
    /// Flat damage removed per element.
    pub defense: ElementVector,
    /// Damage reduction per element, in percent.
    pub resistance: ElementVector,
}

impl CombatantRpgStats {
    /// Stats that leave every formula input unchanged.
    pub const NEUTRAL: Self = Self {
        action_points: 0,
        movement_points: 0,
        range: 0,
        elevation: 0,
        summon_capacity: 0,
        hit_points: 0,
        assiduity: 0,
        rapidity: 0,
        critical_chance: 0,
        critical_damage: 0,
        critical_resistance: 0,
        attack: ElementVector::ZERO,
        power: ElementVector::uniform(100),
        defense: ElementVector::ZERO,
        resistance: ElementVector::ZERO,
    };
}

impl Default for CombatantRpgStats {
    fn default() -> Self {
        Self::NEUTRAL
    }
}
