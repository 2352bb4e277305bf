use super::common::{EntityId, Position3, TeamId};
use super::stats::CombatantRpgStats;

/// Definition of one combatant at battle start.
///
/// Supplied by the roster/configuration layer; consumed by
/// [`crate::BattleState::from_roster`] and [`crate::initiative_order`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorDefinition {
    pub id: EntityId,
    pub team: TeamId,
    pub start_position: Position3,
    pub start_hit_points: i32,
    pub start_movement_points: u32,
    /// Initiative key: higher acts earlier.
    pub rapidity: i32,
    pub stats: Option<CombatantRpgStats>,
    pub skill_resource: Option<i32>,
}

impl ActorDefinition {
    pub fn new(
        id: EntityId,
        team: TeamId,
        start_position: Position3,
        start_hit_points: i32,
        start_movement_points: u32,
        rapidity: i32,
    ) -> Self {
        Self {
            id,
            team,
            start_position,
            start_hit_points,
            start_movement_points,
            rapidity,
            stats: None,
            skill_resource: None,
        }
    }

    /// Attaches RPG stats (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, stats: CombatantRpgStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Attaches a starting skill resource pool (builder pattern).
    #[must_use]
    pub fn with_skill_resource(mut self, amount: i32) -> Self {
        self.skill_resource = Some(amount);
        self
    }
}
