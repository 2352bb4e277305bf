//! Static battlefield terrain.
//!
//! A [`BattleMap`] is built once per battle by the map/configuration layer and
//! is never mutated by actions. It holds the terrain blocks, optional
//! per-column elevations (height map), unwalkable columns and terrain costs.
pub mod pathfinding;

use std::collections::{HashMap, HashSet};

pub use pathfinding::{PathfindingError, find_path};

use crate::config::BattleConfig;
use crate::state::Position3;

/// Grid interpretation used for traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathfindingMode {
    /// Free 3D cells, 6-neighbor traversal.
    #[default]
    Legacy3d,
    /// One elevation per planar column, 4-neighbor traversal.
    HeightMap,
}

/// Static terrain of one battle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleMap {
    mode: PathfindingMode,
    blocked: HashSet<Position3>,
    heights: HashMap<(i32, i32), i32>,
    unwalkable: HashSet<(i32, i32)>,
    terrain_costs: HashMap<(i32, i32), u32>,
}

impl BattleMap {
    /// Empty legacy 3D map: every cell is open.
    pub fn legacy() -> Self {
        Self::default()
    }

    /// Empty height map: no column is known until elevations are set.
    pub fn height_map() -> Self {
        Self {
            mode: PathfindingMode::HeightMap,
            ..Self::default()
        }
    }

    /// Marks a cell as a terrain block (builder pattern).
    #[must_use]
    pub fn with_block(mut self, cell: Position3) -> Self {
        self.blocked.insert(cell);
        self
    }

    #[must_use]
    pub fn with_blocks(mut self, cells: impl IntoIterator<Item = Position3>) -> Self {
        self.blocked.extend(cells);
        self
    }

    /// Sets a column elevation (builder pattern).
    #[must_use]
    pub fn with_height(mut self, x: i32, y: i32, elevation: i32) -> Self {
        self.heights.insert((x, y), elevation);
        self
    }

    /// Fills a rectangle of columns with one elevation.
    #[must_use]
    pub fn with_flat_area(mut self, min: (i32, i32), max: (i32, i32), elevation: i32) -> Self {
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                self.heights.insert((x, y), elevation);
            }
        }
        self
    }

    #[must_use]
    pub fn with_unwalkable(mut self, x: i32, y: i32) -> Self {
        self.unwalkable.insert((x, y));
        self
    }

    #[must_use]
    pub fn with_terrain_cost(mut self, x: i32, y: i32, cost: u32) -> Self {
        self.terrain_costs.insert((x, y), cost);
        self
    }

    pub fn mode(&self) -> PathfindingMode {
        self.mode
    }

    pub fn is_blocked(&self, cell: Position3) -> bool {
        self.blocked.contains(&cell)
    }

    pub fn blocked_cells(&self) -> &HashSet<Position3> {
        &self.blocked
    }

    /// True when some terrain block in `column` reaches `elevation` or above.
    pub fn column_blocks_at(&self, column: (i32, i32), elevation: i32) -> bool {
        self.blocked
            .iter()
            .any(|cell| cell.column() == column && cell.z >= elevation)
    }

    pub fn is_walkable(&self, column: (i32, i32)) -> bool {
        if self.unwalkable.contains(&column) {
            return false;
        }
        match self.mode {
            PathfindingMode::Legacy3d => true,
            PathfindingMode::HeightMap => self.heights.contains_key(&column),
        }
    }

    pub fn elevation(&self, column: (i32, i32)) -> Option<i32> {
        self.heights.get(&column).copied()
    }

    pub fn heights(&self) -> &HashMap<(i32, i32), i32> {
        &self.heights
    }

    /// Cell normalized to the map's interpretation: in height-map mode the
    /// elevation is replaced by the column's stored elevation.
    pub fn normalize(&self, cell: Position3) -> Option<Position3> {
        match self.mode {
            PathfindingMode::Legacy3d => Some(cell),
            PathfindingMode::HeightMap => self.elevation(cell.column()).map(|z| cell.with_z(z)),
        }
    }

    /// Cost of entering the column `cell` belongs to.
    pub fn terrain_cost(&self, cell: Position3) -> u32 {
        self.terrain_costs
            .get(&cell.column())
            .copied()
            .unwrap_or(BattleConfig::DEFAULT_TERRAIN_COST)
    }
}
