//! Hit and critical chances.

use crate::config::BattleConfig;

/// Elevation advantage clamped to the configured band.
pub fn clamped_elevation(elevation_delta: i32) -> i32 {
    elevation_delta.clamp(-BattleConfig::ELEVATION_CLAMP, BattleConfig::ELEVATION_CLAMP)
}

/// Basic attack hit chance in percent, adjusted for elevation and clamped to
/// `[BASIC_HIT_CHANCE_MIN, BASIC_HIT_CHANCE_MAX]`.
pub fn basic_hit_chance(base_hit_chance: i32, elevation_delta: i32) -> i32 {
    let adjusted = base_hit_chance
        .saturating_add(BattleConfig::BASIC_HIT_PER_ELEVATION * clamped_elevation(elevation_delta));
    adjusted.clamp(
        BattleConfig::BASIC_HIT_CHANCE_MIN,
        BattleConfig::BASIC_HIT_CHANCE_MAX,
    )
}

/// Basic attack elevation damage bonus (negative when attacking uphill).
pub fn basic_elevation_damage(elevation_delta: i32) -> i32 {
    BattleConfig::BASIC_DAMAGE_PER_ELEVATION * clamped_elevation(elevation_delta)
}

/// Skill hit chance clamped to `[0, 100]`.
pub fn skill_hit_chance(hit_chance: i32) -> i32 {
    hit_chance.clamp(0, 100)
}

/// Skill critical chance: base plus caster bonus, clamped to `[0, 100]`.
pub fn critical_chance(base_critical_chance: i32, caster_bonus: i32) -> i32 {
    base_critical_chance.saturating_add(caster_bonus).clamp(0, 100)
}
