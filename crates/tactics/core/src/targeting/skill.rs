use crate::action::{FailureReason, Rejection};
use crate::map::{BattleMap, PathfindingMode};
use crate::policy::SkillPolicy;
use crate::state::{BattleState, EntityId, Position3};

use super::line::planar_samples;

/// Geometry of a valid skill cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillTargetReport {
    pub caster_position: Position3,
    pub target_position: Position3,
    pub distance: u32,
    pub effective_max_range: u32,
}

/// Maximum range after the caster's elevation bonus.
///
/// `max_range + floor(elevation / elevation_per_range_bonus) * bonus_per_step`.
/// The bonus is never negative and is disabled when either factor is zero.
pub fn effective_max_range(policy: &SkillPolicy, caster_elevation: i32) -> u32 {
    if policy.elevation_per_range_bonus <= 0 || policy.range_bonus_per_elevation_step <= 0 {
        return policy.max_range;
    }
    let steps = caster_elevation.div_euclid(policy.elevation_per_range_bonus);
    let bonus = steps.saturating_mul(policy.range_bonus_per_elevation_step).max(0);
    policy.max_range.saturating_add(bonus.unsigned_abs())
}

/// Checks that `caster` can reach `target` with the skill.
///
/// Gates, in order: self target, positions, minimum range, effective maximum
/// range, then the planar raycast when the skill needs line of sight. A
/// permitted self target skips the geometric gates.
pub fn evaluate_skill(
    state: &BattleState,
    map: &BattleMap,
    caster: EntityId,
    target: EntityId,
    policy: &SkillPolicy,
) -> Result<SkillTargetReport, Rejection> {
    if caster == target && !policy.allows_self_target {
        return Err(Rejection::new(
            FailureReason::InvalidTargeting,
            format!("skill {} cannot target its caster", policy.skill_id),
        ));
    }
    let (Some(from), Some(to)) = (state.position(caster), state.position(target)) else {
        return Err(Rejection::new(
            FailureReason::MissingPositions,
            format!("{caster} or {target} has no position"),
        ));
    };

    let effective_max_range = effective_max_range(policy, from.z);
    let distance = from.planar_distance(to);
    let report = SkillTargetReport {
        caster_position: from,
        target_position: to,
        distance,
        effective_max_range,
    };
    if caster == target {
        return Ok(report);
    }

    if distance < policy.min_range {
        return Err(Rejection::new(
            FailureReason::TooClose,
            format!("{target} is too close ({distance} < {})", policy.min_range),
        ));
    }
    if distance > effective_max_range {
        return Err(Rejection::new(
            FailureReason::OutOfRange,
            format!("{target} is out of range ({distance} > {effective_max_range})"),
        ));
    }
    if policy.requires_line_of_sight {
        if let Some(column) = first_obstruction(map, from, to) {
            return Err(Rejection::new(
                FailureReason::LineOfSightBlocked,
                format!("line of sight to {target} is blocked at column {column:?}"),
            ));
        }
    }
    Ok(report)
}

/// First sampled column whose terrain reaches the line.
///
/// A terrain block at or above the interpolated elevation obstructs. On a
/// height map a column whose ground rises strictly above the line also does.
fn first_obstruction(map: &BattleMap, from: Position3, to: Position3) -> Option<(i32, i32)> {
    planar_samples(from, to)
        .into_iter()
        .find(|(column, threshold)| {
            if map.column_blocks_at(*column, *threshold) {
                return true;
            }
            map.mode() == PathfindingMode::HeightMap
                && map.elevation(*column).is_some_and(|ground| ground > *threshold)
        })
        .map(|(column, _)| column)
}
