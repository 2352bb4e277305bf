use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("turn order is empty")]
    EmptyTurnOrder,

    #[error("actions per turn must be positive")]
    ZeroActionsPerTurn,

    #[error("it is not {actor}'s turn")]
    NotCurrentActor { actor: EntityId },

    #[error("{actor} is inactive")]
    ActorInactive { actor: EntityId },

    #[error("{actor} has no actions left this turn")]
    NoActionsRemaining { actor: EntityId },
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyTurnOrder | Self::ZeroActionsPerTurn => ErrorSeverity::Fatal,
            Self::NotCurrentActor { .. }
            | Self::ActorInactive { .. }
            | Self::NoActionsRemaining { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTurnOrder => "TURN_EMPTY_ORDER",
            Self::ZeroActionsPerTurn => "TURN_ZERO_ACTIONS",
            Self::NotCurrentActor { .. } => "TURN_NOT_CURRENT",
            Self::ActorInactive { .. } => "TURN_ACTOR_INACTIVE",
            Self::NoActionsRemaining { .. } => "TURN_NO_ACTIONS",
        }
    }
}

/// Orders actors by rapidity, highest first. Ties go to the lower id.
pub fn initiative_order(actors: impl IntoIterator<Item = (EntityId, i32)>) -> Vec<EntityId> {
    let mut actors: Vec<(EntityId, i32)> = actors.into_iter().collect();
    actors.sort_by(|(a_id, a_rap), (b_id, b_rap)| b_rap.cmp(a_rap).then(a_id.cmp(b_id)));
    actors.into_iter().map(|(id, _)| id).collect()
}

/// Round-robin turn state machine.
///
/// Tracks whose turn it is, how many actions remain and which actors are
/// inactive (defeated, stunned out, removed). Inactive actors are skipped
/// when the turn passes on. When nobody is active the budget is zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnController {
    order: Vec<EntityId>,
    actions_per_turn: u32,
    round: u32,
    current_index: usize,
    remaining_actions: u32,
    inactive: BTreeSet<EntityId>,
    time_limit: Option<Duration>,
}

impl TurnController {
    /// Starts round one with the first actor and a full budget.
    pub fn new(order: Vec<EntityId>, actions_per_turn: u32) -> Result<Self, TurnError> {
        Self::with_inactive(order, actions_per_turn, [])
    }

    /// Like [`Self::new`], with some actors inactive from the start. The
    /// first active actor opens the round; if there is none the budget is
    /// zero.
    pub fn with_inactive(
        order: Vec<EntityId>,
        actions_per_turn: u32,
        inactive: impl IntoIterator<Item = EntityId>,
    ) -> Result<Self, TurnError> {
        if order.is_empty() {
            return Err(TurnError::EmptyTurnOrder);
        }
        if actions_per_turn == 0 {
            return Err(TurnError::ZeroActionsPerTurn);
        }
        let inactive: BTreeSet<EntityId> = inactive.into_iter().collect();
        let first_active = order.iter().position(|id| !inactive.contains(id));
        Ok(Self {
            current_index: first_active.unwrap_or(0),
            remaining_actions: if first_active.is_some() {
                actions_per_turn
            } else {
                0
            },
            order,
            actions_per_turn,
            round: 1,
            inactive,
            time_limit: None,
        })
    }

    /// Sets the per-turn time limit (builder pattern).
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn remaining_actions(&self) -> u32 {
        self.remaining_actions
    }

    pub fn actions_per_turn(&self) -> u32 {
        self.actions_per_turn
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    pub fn is_active(&self, actor: EntityId) -> bool {
        self.order.contains(&actor) && !self.inactive.contains(&actor)
    }

    /// The actor whose turn it is, or `None` when nobody is active.
    pub fn current_actor(&self) -> Option<EntityId> {
        let actor = *self.order.get(self.current_index)?;
        self.is_active(actor).then_some(actor)
    }

    /// Checks that `actor` holds the turn and has budget left.
    pub fn ensure_can_act(&self, actor: EntityId) -> Result<(), TurnError> {
        if self.current_actor() != Some(actor) {
            return Err(if self.inactive.contains(&actor) {
                TurnError::ActorInactive { actor }
            } else {
                TurnError::NotCurrentActor { actor }
            });
        }
        if self.remaining_actions == 0 {
            return Err(TurnError::NoActionsRemaining { actor });
        }
        Ok(())
    }

    /// Spends one action of `actor`'s budget. Returns the remaining actions.
    pub fn consume_action(&mut self, actor: EntityId) -> Result<u32, TurnError> {
        self.ensure_can_act(actor)?;
        self.remaining_actions -= 1;
        Ok(self.remaining_actions)
    }

    /// Marks an actor active or inactive.
    ///
    /// Deactivating the current actor passes the turn to the next active
    /// actor with a fresh budget. Other changes leave the budget untouched.
    pub fn set_active(&mut self, actor: EntityId, active: bool) {
        let was_current = self.current_actor() == Some(actor);
        if active {
            self.inactive.remove(&actor);
        } else {
            self.inactive.insert(actor);
            if was_current {
                self.advance();
            }
        }
    }

    /// Passes the turn to the next active actor and refills the budget.
    /// Wrapping past the end of the order starts a new round.
    pub fn end_turn(&mut self) -> Option<EntityId> {
        self.advance();
        self.current_actor()
    }

    /// True when a time limit is set and `elapsed` has reached it.
    pub fn has_timed_out(&self, elapsed: Duration) -> bool {
        self.time_limit.is_some_and(|limit| elapsed >= limit)
    }

    fn advance(&mut self) {
        let len = self.order.len();
        for step in 1..=len {
            let raw = self.current_index + step;
            let index = raw % len;
            if !self.inactive.contains(&self.order[index]) {
                if raw >= len {
                    self.round += 1;
                }
                self.current_index = index;
                self.remaining_actions = self.actions_per_turn;
                return;
            }
        }
        self.remaining_actions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<EntityId> {
        raw.iter().copied().map(EntityId).collect()
    }

    #[test]
    fn construction_fails_fast() {
        assert_eq!(TurnController::new(vec![], 2), Err(TurnError::EmptyTurnOrder));
        assert_eq!(
            TurnController::new(ids(&[1]), 0),
            Err(TurnError::ZeroActionsPerTurn)
        );
    }

    #[test]
    fn initiative_sorts_by_rapidity_then_id() {
        let order = initiative_order([
            (EntityId(3), 5),
            (EntityId(1), 5),
            (EntityId(2), 9),
            (EntityId(4), -1),
        ]);
        assert_eq!(order, ids(&[2, 1, 3, 4]));
    }

    #[test]
    fn budget_is_spent_by_the_current_actor_only() {
        let mut turns = TurnController::new(ids(&[1, 2]), 2).unwrap();
        assert_eq!(
            turns.consume_action(EntityId(2)),
            Err(TurnError::NotCurrentActor { actor: EntityId(2) })
        );
        assert_eq!(turns.ensure_can_act(EntityId(1)), Ok(()));
        assert_eq!(turns.consume_action(EntityId(1)), Ok(1));
        assert_eq!(turns.consume_action(EntityId(1)), Ok(0));
        assert_eq!(
            turns.consume_action(EntityId(1)),
            Err(TurnError::NoActionsRemaining { actor: EntityId(1) })
        );
    }

    #[test]
    fn end_turn_skips_inactive_and_wraps_rounds() {
        let mut turns = TurnController::new(ids(&[1, 2, 3]), 1).unwrap();
        turns.set_active(EntityId(2), false);

        assert_eq!(turns.end_turn(), Some(EntityId(3)));
        assert_eq!(turns.round(), 1);
        assert_eq!(turns.end_turn(), Some(EntityId(1)));
        assert_eq!(turns.round(), 2);
        assert_eq!(turns.remaining_actions(), 1);
    }

    #[test]
    fn deactivating_current_actor_advances_with_fresh_budget() {
        let mut turns = TurnController::new(ids(&[1, 2]), 2).unwrap();
        turns.consume_action(EntityId(1)).unwrap();
        turns.set_active(EntityId(1), false);
        assert_eq!(turns.current_actor(), Some(EntityId(2)));
        assert_eq!(turns.remaining_actions(), 2);
    }

    #[test]
    fn toggling_another_actor_keeps_an_empty_budget_empty() {
        let mut turns = TurnController::new(ids(&[1, 2]), 1).unwrap();
        turns.consume_action(EntityId(1)).unwrap();
        turns.set_active(EntityId(2), false);
        turns.set_active(EntityId(2), true);
        assert_eq!(turns.current_actor(), Some(EntityId(1)));
        assert_eq!(turns.remaining_actions(), 0);
    }

    #[test]
    fn nobody_active_means_no_budget() {
        let mut turns = TurnController::new(ids(&[1]), 2).unwrap();
        turns.set_active(EntityId(1), false);
        assert_eq!(turns.current_actor(), None);
        assert_eq!(turns.remaining_actions(), 0);
        assert_eq!(turns.end_turn(), None);

        let idle = TurnController::with_inactive(ids(&[1, 2]), 2, ids(&[1, 2])).unwrap();
        assert_eq!(idle.remaining_actions(), 0);
    }

    #[test]
    fn timeout_needs_a_limit() {
        let turns = TurnController::new(ids(&[1]), 1).unwrap();
        assert!(!turns.has_timed_out(Duration::from_secs(999)));

        let timed = turns.with_time_limit(Duration::from_secs(30));
        assert!(!timed.has_timed_out(Duration::from_secs(29)));
        assert!(timed.has_timed_out(Duration::from_secs(30)));
    }
}
