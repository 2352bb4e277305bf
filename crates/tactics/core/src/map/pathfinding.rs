//! Grid traversal.
//!
//! Two breadth-first searches, selected by the map's [`PathfindingMode`]:
//!
//! - **Legacy 3D**: 6 neighbors (±x, ±y, ±z) over a blocked-cell set. Without a
//!   map boundary the search is bounded by a radius around the origin:
//!   `manhattan(from, to) + |blocked| + 6`, enough to walk around every block.
//! - **Height map**: 4 planar neighbors over known columns. A neighbor is
//!   visitable only if its elevation differs from the current one by at most
//!   the vertical step limit. Cells are normalized to their column elevation.
//!
//! Neighbor expansion order is fixed, so the returned path is deterministic.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::BattleConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::state::Position3;

use super::{BattleMap, PathfindingMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathfindingError {
    #[error("destination {0} is blocked")]
    DestinationBlocked(Position3),

    #[error("column of {0} has no known elevation")]
    UnknownColumn(Position3),

    #[error("no path from {from} to {to}")]
    NoPathFound { from: Position3, to: Position3 },
}

impl GameError for PathfindingError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DestinationBlocked(_) => "PATH_DESTINATION_BLOCKED",
            Self::UnknownColumn(_) => "PATH_UNKNOWN_COLUMN",
            Self::NoPathFound { .. } => "PATH_NOT_FOUND",
        }
    }
}

const LEGACY_NEIGHBORS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

const PLANAR_NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Finds a path from `from` to `to`, inclusive of both endpoints.
///
/// `blocked` holds every cell that may not be entered (terrain and other
/// entities). `max_vertical_step` only applies in height-map mode.
pub fn find_path(
    map: &BattleMap,
    from: Position3,
    to: Position3,
    blocked: &HashSet<Position3>,
    max_vertical_step: u32,
) -> Result<Vec<Position3>, PathfindingError> {
    match map.mode() {
        PathfindingMode::Legacy3d => find_path_legacy(from, to, blocked),
        PathfindingMode::HeightMap => find_path_height_map(map, from, to, blocked, max_vertical_step),
    }
}

/// 6-neighbor BFS over free 3D cells.
pub fn find_path_legacy(
    from: Position3,
    to: Position3,
    blocked: &HashSet<Position3>,
) -> Result<Vec<Position3>, PathfindingError> {
    if blocked.contains(&to) {
        return Err(PathfindingError::DestinationBlocked(to));
    }
    if from == to {
        return Ok(vec![from]);
    }

    let radius = from.manhattan_distance(to)
        + blocked.len() as u32
        + BattleConfig::LEGACY_SEARCH_PADDING;

    let mut came_from: HashMap<Position3, Position3> = HashMap::new();
    let mut visited: HashSet<Position3> = HashSet::from([from]);
    let mut frontier = VecDeque::from([from]);

    while let Some(current) = frontier.pop_front() {
        for (dx, dy, dz) in LEGACY_NEIGHBORS {
            let next = current.offset(dx, dy, dz);
            if visited.contains(&next) || blocked.contains(&next) {
                continue;
            }
            if from.manhattan_distance(next) > radius {
                continue;
            }
            visited.insert(next);
            came_from.insert(next, current);
            if next == to {
                return Ok(reconstruct_path(&came_from, from, to));
            }
            frontier.push_back(next);
        }
    }

    tracing::trace!(%from, %to, radius, "legacy search exhausted");
    Err(PathfindingError::NoPathFound { from, to })
}

/// 4-neighbor planar BFS over a height map.
///
/// A column is blocked when any blocked cell lies in it.
pub fn find_path_height_map(
    map: &BattleMap,
    from: Position3,
    to: Position3,
    blocked: &HashSet<Position3>,
    max_vertical_step: u32,
) -> Result<Vec<Position3>, PathfindingError> {
    let start = map
        .normalize(from)
        .ok_or(PathfindingError::UnknownColumn(from))?;
    let goal = map.normalize(to).ok_or(PathfindingError::UnknownColumn(to))?;

    let blocked_columns: HashSet<(i32, i32)> = blocked.iter().map(|cell| cell.column()).collect();
    if blocked_columns.contains(&goal.column()) || !map.is_walkable(goal.column()) {
        return Err(PathfindingError::DestinationBlocked(goal));
    }
    if start.column() == goal.column() {
        return Ok(vec![start]);
    }

    let mut came_from: HashMap<Position3, Position3> = HashMap::new();
    let mut visited: HashSet<(i32, i32)> = HashSet::from([start.column()]);
    let mut frontier = VecDeque::from([start]);

    while let Some(current) = frontier.pop_front() {
        for (dx, dy) in PLANAR_NEIGHBORS {
            let column = (current.x + dx, current.y + dy);
            if visited.contains(&column) || blocked_columns.contains(&column) {
                continue;
            }
            if !map.is_walkable(column) {
                continue;
            }
            let Some(elevation) = map.elevation(column) else {
                continue;
            };
            if elevation.abs_diff(current.z) > max_vertical_step {
                continue;
            }
            let next = Position3::new(column.0, column.1, elevation);
            visited.insert(column);
            came_from.insert(next, current);
            if column == goal.column() {
                return Ok(reconstruct_path(&came_from, start, next));
            }
            frontier.push_back(next);
        }
    }

    tracing::trace!(from = %start, to = %goal, "height-map search exhausted");
    Err(PathfindingError::NoPathFound {
        from: start,
        to: goal,
    })
}

fn reconstruct_path(
    came_from: &HashMap<Position3, Position3>,
    start: Position3,
    goal: Position3,
) -> Vec<Position3> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&previous) => {
                path.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32, z: i32) -> Position3 {
        Position3::new(x, y, z)
    }

    #[test]
    fn legacy_straight_line() {
        let path = find_path_legacy(p(0, 0, 0), p(3, 0, 0), &HashSet::new()).unwrap();
        assert_eq!(path, vec![p(0, 0, 0), p(1, 0, 0), p(2, 0, 0), p(3, 0, 0)]);
    }

    #[test]
    fn legacy_routes_around_blocks() {
        let blocked = HashSet::from([p(1, 0, 0), p(1, 1, 0), p(1, -1, 0)]);
        let path = find_path_legacy(p(0, 0, 0), p(2, 0, 0), &blocked).unwrap();

        assert_eq!(path.first(), Some(&p(0, 0, 0)));
        assert_eq!(path.last(), Some(&p(2, 0, 0)));
        assert!(path.iter().all(|cell| !blocked.contains(cell)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn legacy_distinguishes_blocked_destination() {
        let blocked = HashSet::from([p(2, 0, 0)]);
        assert_eq!(
            find_path_legacy(p(0, 0, 0), p(2, 0, 0), &blocked),
            Err(PathfindingError::DestinationBlocked(p(2, 0, 0)))
        );
    }

    #[test]
    fn legacy_enclosed_destination_has_no_path() {
        let goal = p(5, 5, 5);
        let blocked: HashSet<Position3> = LEGACY_NEIGHBORS
            .iter()
            .map(|(dx, dy, dz)| goal.offset(*dx, *dy, *dz))
            .collect();
        assert!(matches!(
            find_path_legacy(p(0, 0, 0), goal, &blocked),
            Err(PathfindingError::NoPathFound { .. })
        ));
    }

    #[test]
    fn height_map_respects_vertical_step() {
        // A wall of elevation 3 at x = 1 except a ramp at y = 2.
        let map = BattleMap::height_map()
            .with_flat_area((0, 0), (2, 2), 0)
            .with_height(1, 0, 3)
            .with_height(1, 1, 3)
            .with_height(1, 2, 1);

        let path = find_path(&map, p(0, 0, 0), p(2, 0, 0), &HashSet::new(), 1).unwrap();
        assert!(path.contains(&p(1, 2, 1)));
        assert_eq!(path.last(), Some(&p(2, 0, 0)));

        let steep = find_path(&map, p(0, 0, 0), p(2, 0, 0), &HashSet::new(), 0);
        assert!(matches!(steep, Err(PathfindingError::NoPathFound { .. })));
    }

    #[test]
    fn height_map_normalizes_endpoints() {
        let map = BattleMap::height_map().with_flat_area((0, 0), (1, 0), 2);
        let path = find_path(&map, p(0, 0, 9), p(1, 0, -4), &HashSet::new(), 1).unwrap();
        assert_eq!(path, vec![p(0, 0, 2), p(1, 0, 2)]);
    }

    #[test]
    fn height_map_unknown_endpoint_fails_immediately() {
        let map = BattleMap::height_map().with_flat_area((0, 0), (1, 0), 0);
        assert_eq!(
            find_path(&map, p(0, 0, 0), p(7, 7, 0), &HashSet::new(), 1),
            Err(PathfindingError::UnknownColumn(p(7, 7, 0)))
        );
        assert_eq!(
            find_path(&map, p(-3, 0, 0), p(1, 0, 0), &HashSet::new(), 1),
            Err(PathfindingError::UnknownColumn(p(-3, 0, 0)))
        );
    }

    #[test]
    fn height_map_blocked_destination_column() {
        let map = BattleMap::height_map().with_flat_area((0, 0), (2, 0), 0);
        let blocked = HashSet::from([p(2, 0, 0)]);
        assert_eq!(
            find_path(&map, p(0, 0, 0), p(2, 0, 0), &blocked, 1),
            Err(PathfindingError::DestinationBlocked(p(2, 0, 0)))
        );
    }
}
