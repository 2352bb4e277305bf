/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Number of actions each actor may take before the turn passes on.
    pub actions_per_turn: u32,
}

impl BattleConfig {
    // ===== wire contract versions =====
    /// Version stamped on every [`crate::BattleStateSnapshot`].
    pub const SNAPSHOT_CONTRACT_VERSION: u32 = 1;
    /// Version stamped on every [`crate::ResolutionPayload`].
    pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;

    // ===== pathfinding =====
    /// Extra slack added to the legacy 3D search radius.
    pub const LEGACY_SEARCH_PADDING: u32 = 6;
    /// Cost of entering a column with no explicit terrain cost.
    pub const DEFAULT_TERRAIN_COST: u32 = 1;

    // ===== basic attack resolution =====
    pub const BASIC_HIT_CHANCE_MIN: i32 = 5;
    pub const BASIC_HIT_CHANCE_MAX: i32 = 95;
    /// Hit chance gained per clamped elevation step above the target.
    pub const BASIC_HIT_PER_ELEVATION: i32 = 5;
    /// Damage gained per clamped elevation step above the target.
    pub const BASIC_DAMAGE_PER_ELEVATION: i32 = 2;
    /// Elevation advantage is clamped to `[-ELEVATION_CLAMP, ELEVATION_CLAMP]`.
    pub const ELEVATION_CLAMP: i32 = 2;

    // ===== shared resolution =====
    /// Damage variance roll is drawn from `[0, DAMAGE_VARIANCE)`.
    pub const DAMAGE_VARIANCE: i32 = 4;
    /// Base critical multiplier, in percent.
    pub const BASE_CRITICAL_MULTIPLIER_PERCENT: i64 = 125;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ACTIONS_PER_TURN: u32 = 2;

    pub fn new() -> Self {
        Self {
            actions_per_turn: Self::DEFAULT_ACTIONS_PER_TURN,
        }
    }

    pub fn with_actions_per_turn(actions_per_turn: u32) -> Self {
        Self { actions_per_turn }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
