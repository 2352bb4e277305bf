use std::collections::HashSet;

use crate::env::BattleEnv;
use crate::map::{BattleMap, PathfindingError, PathfindingMode, find_path};
use crate::policy::MovePolicy;
use crate::rng::RngService;
use crate::state::{BattleState, EntityId, Position3};

use super::{ActionResolution, ActionTransition, FailureReason, Rejection, ResolutionPayload};

/// Moves an actor from its declared origin to a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    pub actor: EntityId,
    pub origin: Position3,
    pub destination: Position3,
    /// Overrides the battle's default movement policy.
    pub policy: Option<MovePolicy>,
}

impl MoveAction {
    pub fn new(actor: EntityId, origin: Position3, destination: Position3) -> Self {
        Self {
            actor,
            origin,
            destination,
            policy: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: MovePolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// A validated move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    /// Path inclusive of both endpoints, normalized to the map.
    pub path: Vec<Position3>,
    pub cost: u32,
    pub budget: u32,
}

impl MovePlan {
    pub fn destination(&self) -> Option<Position3> {
        self.path.last().copied()
    }
}

/// Move validation service.
///
/// Gates, in order: policy sanity, declared origin, destination (terrain,
/// occupancy, walkability), non-empty move, whole-move vertical limit, path
/// search, per-step vertical limit and cost budget. The path search treats
/// terrain blocks and every other entity as obstacles.
pub fn validate_move(
    state: &BattleState,
    map: &BattleMap,
    actor: EntityId,
    origin: Position3,
    destination: Position3,
    policy: &MovePolicy,
) -> Result<MovePlan, Rejection> {
    if !policy.is_valid() {
        return Err(Rejection::new(
            FailureReason::InvalidPolicy,
            "move policy needs a positive budget and a non-negative vertical step",
        ));
    }
    let Some(current) = state.position(actor) else {
        return Err(Rejection::new(
            FailureReason::MissingPositions,
            format!("{actor} has no position"),
        ));
    };
    if current != origin {
        return Err(Rejection::new(
            FailureReason::InvalidOrigin,
            format!("{actor} stands at {current}, not {origin}"),
        ));
    }

    let Some(origin) = map.normalize(origin) else {
        return Err(Rejection::new(
            FailureReason::InvalidOrigin,
            format!("{origin} lies outside the map"),
        ));
    };
    let Some(destination) = map.normalize(destination) else {
        return Err(Rejection::new(
            FailureReason::DestinationBlocked,
            format!("{destination} lies outside the map"),
        ));
    };
    if destination_blocked(map, destination) {
        return Err(Rejection::new(
            FailureReason::DestinationBlocked,
            format!("{destination} is blocked"),
        ));
    }
    if let Some(occupant) = destination_occupant(state, map, actor, destination) {
        return Err(Rejection::new(
            FailureReason::DestinationOccupied,
            format!("{destination} is occupied by {occupant}"),
        ));
    }
    if !map.is_walkable(destination.column()) {
        return Err(Rejection::new(
            FailureReason::DestinationBlocked,
            format!("{destination} is not walkable"),
        ));
    }
    if origin == destination {
        return Err(Rejection::new(
            FailureReason::NoMovement,
            format!("{actor} is already at {destination}"),
        ));
    }

    let max_step = policy.max_vertical_step.unsigned_abs();
    let climb = origin.z.abs_diff(destination.z);
    if climb > max_step {
        return Err(Rejection::new(
            FailureReason::VerticalStepTooHigh,
            format!("elevation change {climb} exceeds {max_step}"),
        ));
    }

    let mut obstacles: HashSet<Position3> = map.blocked_cells().clone();
    obstacles.extend(
        state
            .positions_except(&[actor])
            .into_iter()
            .map(|(_, position)| position)
            .filter(|position| *position != origin && *position != destination),
    );

    let path = find_path(map, origin, destination, &obstacles, max_step).map_err(|error| {
        let reason = match error {
            PathfindingError::DestinationBlocked(_) => FailureReason::DestinationBlocked,
            PathfindingError::UnknownColumn(_) | PathfindingError::NoPathFound { .. } => {
                FailureReason::BlockedPath
            }
        };
        Rejection::new(reason, error.to_string())
    })?;

    let cost = path_cost(map, &path, policy)?;
    if cost > policy.max_cost {
        return Err(Rejection::new(
            FailureReason::MovementBudgetExceeded,
            format!("path costs {cost}, budget is {}", policy.max_cost),
        )
        .with_payload(ResolutionPayload::new(
            "move_cost",
            saturate(cost),
            saturate(policy.max_cost),
            saturate(path.len().saturating_sub(1) as u32),
        )));
    }

    Ok(MovePlan {
        path,
        cost,
        budget: policy.max_cost,
    })
}

/// Sum over steps of terrain cost plus vertical step cost.
fn path_cost(map: &BattleMap, path: &[Position3], policy: &MovePolicy) -> Result<u32, Rejection> {
    let max_step = policy.max_vertical_step.unsigned_abs();
    let mut cost: u32 = 0;
    for step in path.windows(2) {
        let climb = step[0].z.abs_diff(step[1].z);
        if climb > max_step {
            return Err(Rejection::new(
                FailureReason::VerticalStepTooHigh,
                format!("step {} -> {} climbs {climb}", step[0], step[1]),
            ));
        }
        cost = cost
            .saturating_add(map.terrain_cost(step[1]))
            .saturating_add(policy.vertical_step_cost.saturating_mul(climb));
    }
    Ok(cost)
}

fn destination_blocked(map: &BattleMap, destination: Position3) -> bool {
    match map.mode() {
        PathfindingMode::Legacy3d => map.is_blocked(destination),
        PathfindingMode::HeightMap => map.column_blocks_at(destination.column(), i32::MIN),
    }
}

/// Lowest other entity standing on the destination. Height maps compare
/// columns, since stored elevations need not match the surface.
fn destination_occupant(
    state: &BattleState,
    map: &BattleMap,
    actor: EntityId,
    destination: Position3,
) -> Option<EntityId> {
    state
        .positions_except(&[actor])
        .into_iter()
        .find(|(_, position)| match map.mode() {
            PathfindingMode::Legacy3d => *position == destination,
            PathfindingMode::HeightMap => position.column() == destination.column(),
        })
        .map(|(id, _)| id)
}

fn saturate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl ActionTransition for MoveAction {
    type Plan = MovePlan;

    fn pre_validate(
        &self,
        state: &BattleState,
        env: &BattleEnv<'_>,
    ) -> Result<MovePlan, Rejection> {
        if state.hit_points(self.actor).is_some_and(|hp| hp <= 0) {
            return Err(Rejection::new(
                FailureReason::ActorDefeated,
                format!("{} is defeated", self.actor),
            ));
        }
        let policy = env.resolve_move_policy(self.policy);
        let plan = validate_move(
            state,
            env.map(),
            self.actor,
            self.origin,
            self.destination,
            &policy,
        )?;

        if let Some(points) = state.movement_points(self.actor) {
            if points.current < plan.cost {
                return Err(Rejection::new(
                    FailureReason::MovementPointsInsufficient,
                    format!(
                        "{} has {} movement points, path costs {}",
                        self.actor, points.current, plan.cost
                    ),
                )
                .with_payload(ResolutionPayload::new(
                    "movement_points",
                    saturate(points.current),
                    saturate(plan.cost),
                    0,
                )));
            }
        }
        Ok(plan)
    }

    fn apply(
        &self,
        plan: MovePlan,
        state: &mut BattleState,
        _env: &BattleEnv<'_>,
        _rng: &mut dyn RngService,
    ) -> ActionResolution {
        let Some(destination) = plan.destination() else {
            return ActionResolution::rejected(FailureReason::BlockedPath, "empty path");
        };
        if let Err(error) = state.spend_movement_points(self.actor, plan.cost) {
            return ActionResolution::rejected(
                FailureReason::MovementPointsInsufficient,
                error.to_string(),
            );
        }
        state.set_position(self.actor, destination);

        let steps = plan.path.len().saturating_sub(1) as u32;
        ActionResolution::succeeded(format!(
            "{} moved to {destination} (cost {})",
            self.actor, plan.cost
        ))
        .with_payload(ResolutionPayload::new(
            "move_cost",
            saturate(plan.cost),
            saturate(plan.budget),
            saturate(steps),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::state::{ActorDefinition, TeamId};

    fn p(x: i32, y: i32, z: i32) -> Position3 {
        Position3::new(x, y, z)
    }

    fn solo(at: Position3) -> BattleState {
        BattleState::from_roster(&[ActorDefinition::new(EntityId(1), TeamId(1), at, 10, 6, 5)])
    }

    fn run(state: &mut BattleState, map: &BattleMap, action: MoveAction) -> ActionResolution {
        let env = BattleEnv::new(map);
        action.execute(state, &env, &mut ScriptedRng::new([]))
    }

    #[test]
    fn successful_move_spends_points_and_relocates() {
        let mut state = solo(p(0, 0, 0));
        let resolution = run(
            &mut state,
            &BattleMap::legacy(),
            MoveAction::new(EntityId(1), p(0, 0, 0), p(2, 1, 0)),
        );
        assert!(resolution.success, "{resolution:?}");
        assert_eq!(state.position(EntityId(1)), Some(p(2, 1, 0)));
        assert_eq!(state.movement_points(EntityId(1)).map(|mp| mp.current), Some(3));
        assert_eq!(resolution.payload_value(1), Some(3));
    }

    #[test]
    fn wrong_origin_is_rejected() {
        let mut state = solo(p(0, 0, 0));
        let resolution = run(
            &mut state,
            &BattleMap::legacy(),
            MoveAction::new(EntityId(1), p(1, 0, 0), p(2, 0, 0)),
        );
        assert_eq!(resolution.failure_reason, FailureReason::InvalidOrigin);
        assert_eq!(state.position(EntityId(1)), Some(p(0, 0, 0)));
    }

    #[test]
    fn zero_budget_policy_is_invalid() {
        let mut state = solo(p(0, 0, 0));
        let resolution = run(
            &mut state,
            &BattleMap::legacy(),
            MoveAction::new(EntityId(1), p(0, 0, 0), p(1, 0, 0)).with_policy(MovePolicy::new(0, 1, 1)),
        );
        assert_eq!(resolution.failure_reason, FailureReason::InvalidPolicy);
    }

    #[test]
    fn destination_gates() {
        let map = BattleMap::legacy().with_block(p(1, 0, 0));
        let mut state = BattleState::from_roster(&[
            ActorDefinition::new(EntityId(1), TeamId(1), p(0, 0, 0), 10, 6, 5),
            ActorDefinition::new(EntityId(2), TeamId(2), p(0, 1, 0), 10, 6, 5),
        ]);

        let blocked = run(&mut state, &map, MoveAction::new(EntityId(1), p(0, 0, 0), p(1, 0, 0)));
        assert_eq!(blocked.failure_reason, FailureReason::DestinationBlocked);

        let occupied = run(&mut state, &map, MoveAction::new(EntityId(1), p(0, 0, 0), p(0, 1, 0)));
        assert_eq!(occupied.failure_reason, FailureReason::DestinationOccupied);

        let still = run(&mut state, &map, MoveAction::new(EntityId(1), p(0, 0, 0), p(0, 0, 0)));
        assert_eq!(still.failure_reason, FailureReason::NoMovement);
    }

    #[test]
    fn vertical_limit_applies_to_whole_move() {
        let mut state = solo(p(0, 0, 0));
        let resolution = run(
            &mut state,
            &BattleMap::legacy(),
            MoveAction::new(EntityId(1), p(0, 0, 0), p(0, 0, 2)),
        );
        assert_eq!(resolution.failure_reason, FailureReason::VerticalStepTooHigh);
    }

    #[test]
    fn enclosed_destination_has_blocked_path() {
        let goal = p(3, 0, 0);
        let walls = [
            p(4, 0, 0),
            p(2, 0, 0),
            p(3, 1, 0),
            p(3, -1, 0),
            p(3, 0, 1),
            p(3, 0, -1),
        ];
        let map = BattleMap::legacy().with_blocks(walls);
        let mut state = solo(p(0, 0, 0));
        let resolution = run(
            &mut state,
            &map,
            MoveAction::new(EntityId(1), p(0, 0, 0), goal).with_policy(MovePolicy::new(20, 1, 1)),
        );
        assert_eq!(resolution.failure_reason, FailureReason::BlockedPath);
    }

    #[test]
    fn budget_and_movement_points_are_separate_gates() {
        let mut state = solo(p(0, 0, 0));
        let over_budget = run(
            &mut state,
            &BattleMap::legacy(),
            MoveAction::new(EntityId(1), p(0, 0, 0), p(4, 0, 0)),
        );
        assert_eq!(over_budget.failure_reason, FailureReason::MovementBudgetExceeded);
        assert_eq!(over_budget.payload_value(1), Some(4));

        let mut tired = BattleState::from_roster(&[ActorDefinition::new(
            EntityId(1),
            TeamId(1),
            p(0, 0, 0),
            10,
            2,
            5,
        )]);
        let resolution = run(
            &mut tired,
            &BattleMap::legacy(),
            MoveAction::new(EntityId(1), p(0, 0, 0), p(3, 0, 0)),
        );
        assert_eq!(resolution.failure_reason, FailureReason::MovementPointsInsufficient);
        assert_eq!(tired.position(EntityId(1)), Some(p(0, 0, 0)));
    }

    #[test]
    fn height_map_climb_costs_extra() {
        let map = BattleMap::height_map()
            .with_flat_area((0, 0), (3, 0), 0)
            .with_height(1, 0, 1)
            .with_height(2, 0, 1);
        let mut state = solo(p(0, 0, 0));
        // 3 tiles + 1 climb + 1 descent
        let resolution = run(
            &mut state,
            &map,
            MoveAction::new(EntityId(1), p(0, 0, 0), p(3, 0, 0)).with_policy(MovePolicy::new(5, 1, 1)),
        );
        assert!(resolution.success, "{resolution:?}");
        assert_eq!(resolution.payload_value(1), Some(5));
    }

    #[test]
    fn height_map_occupancy_ignores_stored_elevation() {
        let map = BattleMap::height_map().with_flat_area((0, 0), (3, 0), 0);
        let mut state = BattleState::from_roster(&[
            ActorDefinition::new(EntityId(1), TeamId(1), p(0, 0, 0), 10, 6, 5),
            ActorDefinition::new(EntityId(2), TeamId(2), p(2, 0, 7), 10, 6, 5),
        ]);
        let resolution = run(&mut state, &map, MoveAction::new(EntityId(1), p(0, 0, 0), p(2, 0, 0)));
        assert_eq!(resolution.failure_reason, FailureReason::DestinationOccupied);
        assert_eq!(state.position(EntityId(1)), Some(p(0, 0, 0)));
    }
}
