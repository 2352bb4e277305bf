//! Element-aware damage formula.
//!
//! All arithmetic is integer (`i128`) so results are identical everywhere:
//!
//! ```text
//! pre        = base + attack[e] - defense[e]
//! final      = floor(pre * power[e] * (100 - resistance[e]) / 10_000)
//! critical   = floor(final * (125 + critical_damage - critical_resistance) / 100)
//! ```
//!
//! Intermediate terms are not clamped; only the result is, to `[0, i32::MAX]`.

use crate::config::BattleConfig;
use crate::state::{CombatantRpgStats, DamageElement};

/// Inputs of one damage computation.
#[derive(Clone, Copy, Debug)]
pub struct DamageContext<'a> {
    pub base: i32,
    pub element: DamageElement,
    pub critical: bool,
    pub attacker: Option<&'a CombatantRpgStats>,
    pub defender: Option<&'a CombatantRpgStats>,
}

impl<'a> DamageContext<'a> {
    pub fn new(base: i32, element: DamageElement) -> Self {
        Self {
            base,
            element,
            critical: false,
            attacker: None,
            defender: None,
        }
    }

    #[must_use]
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    #[must_use]
    pub fn with_stats(
        mut self,
        attacker: Option<&'a CombatantRpgStats>,
        defender: Option<&'a CombatantRpgStats>,
    ) -> Self {
        self.attacker = attacker;
        self.defender = defender;
        self
    }
}

/// Final damage for `ctx`.
///
/// Without stats on either side the base is returned unchanged (floored at
/// zero). When only one side has stats the other uses
/// [`CombatantRpgStats::NEUTRAL`].
pub fn compute_damage(ctx: &DamageContext<'_>) -> i32 {
    if ctx.attacker.is_none() && ctx.defender.is_none() {
        return ctx.base.max(0);
    }
    let attacker = ctx.attacker.unwrap_or(&CombatantRpgStats::NEUTRAL);
    let defender = ctx.defender.unwrap_or(&CombatantRpgStats::NEUTRAL);
    let e = ctx.element;

    let pre = i128::from(ctx.base) + i128::from(attacker.attack.get(e))
        - i128::from(defender.defense.get(e));
    let power = i128::from(attacker.power.get(e));
    let mitigation = 100 - i128::from(defender.resistance.get(e));
    let mut damage = (pre * power * mitigation).div_euclid(10_000);

    if ctx.critical {
        let multiplier = i128::from(BattleConfig::BASE_CRITICAL_MULTIPLIER_PERCENT)
            + i128::from(attacker.critical_damage)
            - i128::from(defender.critical_resistance);
        damage = (damage * multiplier).div_euclid(100);
    }

    i32::try_from(damage.clamp(0, i128::from(i32::MAX))).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ElementVector;

    #[test]
    fn no_stats_passes_base_through() {
        assert_eq!(compute_damage(&DamageContext::new(7, DamageElement::Physical)), 7);
        assert_eq!(compute_damage(&DamageContext::new(-3, DamageElement::Physical)), 0);
        assert_eq!(
            compute_damage(&DamageContext::new(7, DamageElement::Physical).with_critical(true)),
            7
        );
    }

    #[test]
    fn neutral_stats_are_identity() {
        let neutral = CombatantRpgStats::NEUTRAL;
        let ctx = DamageContext::new(10, DamageElement::Piercing).with_stats(Some(&neutral), None);
        assert_eq!(compute_damage(&ctx), 10);
    }

    #[test]
    fn attack_defense_power_resistance() {
        let attacker = CombatantRpgStats {
            attack: ElementVector::ZERO.with(DamageElement::Elemental, 4),
            power: ElementVector::uniform(100).with(DamageElement::Elemental, 150),
            ..CombatantRpgStats::NEUTRAL
        };
        let defender = CombatantRpgStats {
            defense: ElementVector::ZERO.with(DamageElement::Elemental, 2),
            resistance: ElementVector::ZERO.with(DamageElement::Elemental, 25),
            ..CombatantRpgStats::NEUTRAL
        };
        // pre = 10 + 4 - 2 = 12; 12 * 150 * 75 / 10000 = 13.5 -> 13
        let ctx = DamageContext::new(10, DamageElement::Elemental)
            .with_stats(Some(&attacker), Some(&defender));
        assert_eq!(compute_damage(&ctx), 13);

        // other elements are untouched
        let ctx = DamageContext::new(10, DamageElement::Blunt)
            .with_stats(Some(&attacker), Some(&defender));
        assert_eq!(compute_damage(&ctx), 10);
    }

    #[test]
    fn critical_multiplier() {
        let attacker = CombatantRpgStats {
            critical_damage: 25,
            ..CombatantRpgStats::NEUTRAL
        };
        let defender = CombatantRpgStats {
            critical_resistance: 10,
            ..CombatantRpgStats::NEUTRAL
        };
        // 10 * (125 + 25 - 10) / 100 = 14
        let ctx = DamageContext::new(10, DamageElement::Physical)
            .with_critical(true)
            .with_stats(Some(&attacker), Some(&defender));
        assert_eq!(compute_damage(&ctx), 14);
    }

    #[test]
    fn overwhelming_defense_floors_at_zero() {
        let defender = CombatantRpgStats {
            defense: ElementVector::uniform(50),
            ..CombatantRpgStats::NEUTRAL
        };
        let ctx = DamageContext::new(10, DamageElement::Physical).with_stats(None, Some(&defender));
        assert_eq!(compute_damage(&ctx), 0);
    }

    #[test]
    fn resistance_above_hundred_is_not_clamped_early() {
        let absorbing = CombatantRpgStats {
            resistance: ElementVector::uniform(150),
            ..CombatantRpgStats::NEUTRAL
        };
        // 10 * 100 * (100 - 150) / 10000 = -5 -> 0
        let ctx = DamageContext::new(10, DamageElement::Physical).with_stats(None, Some(&absorbing));
        assert_eq!(compute_damage(&ctx), 0);

        // pre = 10 - 50 = -40; -40 * 100 * -50 / 10000 = 20
        let fortified = CombatantRpgStats {
            defense: ElementVector::uniform(50),
            ..absorbing
        };
        let ctx = DamageContext::new(10, DamageElement::Physical).with_stats(None, Some(&fortified));
        assert_eq!(compute_damage(&ctx), 20);
    }

    #[test]
    fn extreme_stats_saturate() {
        let attacker = CombatantRpgStats {
            attack: ElementVector::uniform(i32::MAX),
            power: ElementVector::uniform(i32::MAX),
            critical_damage: i32::MAX,
            ..CombatantRpgStats::NEUTRAL
        };
        let ctx = DamageContext::new(i32::MAX, DamageElement::Spiritual)
            .with_critical(true)
            .with_stats(Some(&attacker), None);
        assert_eq!(compute_damage(&ctx), i32::MAX);
    }
}
