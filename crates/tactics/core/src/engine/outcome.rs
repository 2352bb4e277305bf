use std::collections::BTreeSet;

use crate::state::{BattleState, Position3, TeamId};

/// Result of evaluating a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    #[default]
    Ongoing,
    Victory(TeamId),
    Draw,
}

impl BattleOutcome {
    pub fn is_battle_over(self) -> bool {
        !matches!(self, Self::Ongoing)
    }

    /// Winning team; [`TeamId::NONE`] for draws and ongoing battles.
    pub fn winner(self) -> TeamId {
        match self {
            Self::Victory(team) => team,
            Self::Ongoing | Self::Draw => TeamId::NONE,
        }
    }
}

/// Pluggable win condition consulted before team elimination.
///
/// Returning `None` defers to the next strategy (and finally to elimination).
pub trait ObjectiveStrategy {
    fn evaluate(&self, state: &BattleState) -> Option<BattleOutcome>;
}

/// Teams of every living entity that has one, ascending.
fn living_teams(state: &BattleState, within: impl Fn(Position3) -> bool) -> BTreeSet<TeamId> {
    state
        .living_entities()
        .into_iter()
        .filter(|id| state.position(*id).is_some_and(&within))
        .filter_map(|id| state.team(id))
        .collect()
}

/// A team wins by being the only one with living units on a control point.
///
/// An empty point defers; a contested point keeps the battle going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlPointObjective {
    pub center: Position3,
    /// Planar manhattan radius of the point.
    pub radius: u32,
}

impl ControlPointObjective {
    pub fn new(center: Position3, radius: u32) -> Self {
        Self { center, radius }
    }
}

impl ObjectiveStrategy for ControlPointObjective {
    fn evaluate(&self, state: &BattleState) -> Option<BattleOutcome> {
        let holders = living_teams(state, |position| {
            position.planar_distance(self.center) <= self.radius
        });
        let mut teams = holders.iter();
        match (teams.next(), teams.next()) {
            (None, _) => None,
            (Some(team), None) => Some(BattleOutcome::Victory(*team)),
            (Some(_), Some(_)) => Some(BattleOutcome::Ongoing),
        }
    }
}

/// Decides whether a battle is over.
///
/// Objectives are asked in registration order; the first answer wins. Without
/// an answer, the battle is decided by elimination: no living team is a draw,
/// one living team wins, more keep the battle going.
#[derive(Default)]
pub struct OutcomeEvaluator {
    objectives: Vec<Box<dyn ObjectiveStrategy>>,
}

impl OutcomeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an objective (builder pattern).
    #[must_use]
    pub fn with_objective(mut self, objective: impl ObjectiveStrategy + 'static) -> Self {
        self.objectives.push(Box::new(objective));
        self
    }

    pub fn evaluate(&self, state: &BattleState) -> BattleOutcome {
        if let Some(outcome) = self
            .objectives
            .iter()
            .find_map(|objective| objective.evaluate(state))
        {
            return outcome;
        }

        let teams = living_teams(state, |_| true);
        let mut remaining = teams.iter();
        match (remaining.next(), remaining.next()) {
            (None, _) => BattleOutcome::Draw,
            (Some(team), None) => BattleOutcome::Victory(*team),
            (Some(_), Some(_)) => BattleOutcome::Ongoing,
        }
    }
}

impl std::fmt::Debug for OutcomeEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeEvaluator")
            .field("objectives", &self.objectives.len())
            .finish()
    }
}
