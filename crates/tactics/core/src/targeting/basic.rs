use crate::action::{FailureReason, Rejection};
use crate::map::BattleMap;
use crate::policy::BasicAttackPolicy;
use crate::state::{BattleState, EntityId, Position3};

use super::line::line_samples;

/// Geometry of a valid basic attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicTargetReport {
    pub attacker_position: Position3,
    pub target_position: Position3,
    pub distance: u32,
    /// Attacker elevation minus target elevation.
    pub elevation_delta: i32,
}

/// Checks that `attacker` can strike `target` under `policy`.
///
/// Gates, in order: self target, policy, positions, minimum range, maximum
/// range, elevation delta, then the sampled 3D line. Terrain blocks and any
/// entity other than the two participants obstruct the line.
pub fn evaluate_basic_attack(
    state: &BattleState,
    map: &BattleMap,
    attacker: EntityId,
    target: EntityId,
    policy: &BasicAttackPolicy,
) -> Result<BasicTargetReport, Rejection> {
    if attacker == target {
        return Err(Rejection::new(
            FailureReason::SelfTargeting,
            format!("{attacker} cannot attack itself"),
        ));
    }
    if !policy.is_valid() {
        return Err(Rejection::new(
            FailureReason::InvalidPolicy,
            "basic attack policy is inconsistent",
        ));
    }
    let (Some(from), Some(to)) = (state.position(attacker), state.position(target)) else {
        return Err(Rejection::new(
            FailureReason::MissingPositions,
            format!("{attacker} or {target} has no position"),
        ));
    };

    let distance = from.planar_distance(to);
    if distance < policy.min_range {
        return Err(Rejection::new(
            FailureReason::TooClose,
            format!("{target} is too close ({distance} < {})", policy.min_range),
        ));
    }
    if distance > policy.max_range {
        return Err(Rejection::new(
            FailureReason::OutOfRange,
            format!("{target} is out of range ({distance} > {})", policy.max_range),
        ));
    }
    if from.z.abs_diff(to.z) > policy.max_line_of_sight_delta {
        return Err(Rejection::new(
            FailureReason::LineOfSightBlocked,
            format!("elevation gap to {target} is too large"),
        ));
    }

    for cell in line_samples(from, to) {
        let occupied = state
            .occupant_at(cell)
            .is_some_and(|occupant| occupant != attacker && occupant != target);
        if map.is_blocked(cell) || occupied {
            return Err(Rejection::new(
                FailureReason::LineOfSightBlocked,
                format!("line of sight to {target} is blocked at {cell}"),
            ));
        }
    }

    Ok(BasicTargetReport {
        attacker_position: from,
        target_position: to,
        distance,
        elevation_delta: from.z - to.z,
    })
}
