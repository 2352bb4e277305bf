//! Static environment shared by every action of a battle.
//!
//! The environment bundles read-only collaborator data: the terrain and the
//! default policies used when a command carries no override. Commands borrow
//! it for the duration of one resolution and never mutate it.

use crate::map::BattleMap;
use crate::policy::{BasicAttackPolicy, MovePolicy};

/// Read-only battle environment.
#[derive(Clone, Copy, Debug)]
pub struct BattleEnv<'a> {
    map: &'a BattleMap,
    move_policy: MovePolicy,
    basic_attack_policy: BasicAttackPolicy,
}

impl<'a> BattleEnv<'a> {
    pub fn new(map: &'a BattleMap) -> Self {
        Self {
            map,
            move_policy: MovePolicy::default(),
            basic_attack_policy: BasicAttackPolicy::default(),
        }
    }

    /// Sets the default movement policy (builder pattern).
    #[must_use]
    pub fn with_move_policy(mut self, policy: MovePolicy) -> Self {
        self.move_policy = policy;
        self
    }

    /// Sets the default basic attack policy (builder pattern).
    #[must_use]
    pub fn with_basic_attack_policy(mut self, policy: BasicAttackPolicy) -> Self {
        self.basic_attack_policy = policy;
        self
    }

    pub fn map(&self) -> &'a BattleMap {
        self.map
    }

    /// The override when present, otherwise the battle default.
    pub fn resolve_move_policy(&self, override_policy: Option<MovePolicy>) -> MovePolicy {
        match override_policy {
            Some(policy) => policy,
            None => self.move_policy,
        }
    }

    /// The override when present, otherwise the battle default.
    pub fn resolve_basic_attack_policy(
        &self,
        override_policy: Option<BasicAttackPolicy>,
    ) -> BasicAttackPolicy {
        match override_policy {
            Some(policy) => policy,
            None => self.basic_attack_policy,
        }
    }
}
