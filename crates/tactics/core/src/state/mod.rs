//! Authoritative battle state representation.
//!
//! [`BattleState`] owns every mutable value of one battle: positions, hit
//! points, movement points, skill resources, cooldowns, status effects, stats,
//! the tick counter and the event log. It is created once per battle and is
//! an explicitly passed, single-owner value: no globals, no interior
//! mutability.
//!
//! Callers only read from it. Mutation is crate-private and happens inside
//! action commands invoked by [`crate::engine::ActionResolver`], which is also
//! the only place the tick advances and events are appended.
pub mod error;
pub mod event;
pub mod snapshot;
pub mod types;

use std::collections::{BTreeSet, HashMap};

pub use error::StateError;
pub use event::BattleEvent;
pub use snapshot::{BattleStateSnapshot, CooldownEntry, EntityValue, StatusEffectEntry};
pub use types::{
    ActorDefinition, CombatantRpgStats, CooldownKey, DamageElement, ElementVector, EntityId,
    MovementPoints, Position3, SkillId, StatusEffectKind, StatusEffectState, StatusKey, TeamId,
    Tick, TickMoment,
};

use crate::config::BattleConfig;

/// Mutable state of one battle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleState {
    tick: Tick,
    teams: HashMap<EntityId, TeamId>,
    positions: HashMap<EntityId, Position3>,
    hit_points: HashMap<EntityId, i32>,
    movement_points: HashMap<EntityId, MovementPoints>,
    skill_resources: HashMap<EntityId, i32>,
    cooldowns: HashMap<CooldownKey, u32>,
    status_effects: HashMap<StatusKey, StatusEffectState>,
    stats: HashMap<EntityId, CombatantRpgStats>,
    event_log: Vec<BattleEvent>,
}

impl BattleState {
    /// Creates an empty state at tick zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the initial state of a battle from its roster.
    ///
    /// Later definitions with a duplicate id overwrite earlier ones.
    pub fn from_roster(roster: &[ActorDefinition]) -> Self {
        let mut state = Self::new();
        for actor in roster {
            state.teams.insert(actor.id, actor.team);
            state.positions.insert(actor.id, actor.start_position);
            state.hit_points.insert(actor.id, actor.start_hit_points);
            state
                .movement_points
                .insert(actor.id, MovementPoints::full(actor.start_movement_points));
            if let Some(stats) = actor.stats {
                state.stats.insert(actor.id, stats);
            }
            if let Some(resource) = actor.skill_resource {
                state.skill_resources.insert(actor.id, resource);
            }
        }
        state
    }

    /// Builds a fresh state from a snapshot. The event log starts empty.
    pub fn from_snapshot(snapshot: &BattleStateSnapshot) -> Result<Self, StateError> {
        let mut state = Self::new();
        state.apply_snapshot(snapshot)?;
        Ok(state)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn team(&self, entity: EntityId) -> Option<TeamId> {
        self.teams.get(&entity).copied()
    }

    pub fn position(&self, entity: EntityId) -> Option<Position3> {
        self.positions.get(&entity).copied()
    }

    pub fn hit_points(&self, entity: EntityId) -> Option<i32> {
        self.hit_points.get(&entity).copied()
    }

    /// An entity is alive while it has a hit points entry above zero.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.hit_points(entity).is_some_and(|hp| hp > 0)
    }

    pub fn movement_points(&self, entity: EntityId) -> Option<MovementPoints> {
        self.movement_points.get(&entity).copied()
    }

    pub fn skill_resource(&self, entity: EntityId) -> Option<i32> {
        self.skill_resources.get(&entity).copied()
    }

    /// Remaining cooldown turns; zero when the skill is ready.
    pub fn cooldown(&self, entity: EntityId, skill: SkillId) -> u32 {
        self.cooldowns
            .get(&CooldownKey::new(entity, skill))
            .copied()
            .unwrap_or(0)
    }

    pub fn status_effect(
        &self,
        entity: EntityId,
        kind: StatusEffectKind,
    ) -> Option<StatusEffectState> {
        self.status_effects
            .get(&StatusKey::new(entity, kind))
            .copied()
    }

    /// Status effects of one entity, sorted by kind.
    pub fn status_effects_of(&self, entity: EntityId) -> Vec<(StatusEffectKind, StatusEffectState)> {
        let mut effects: Vec<_> = self
            .status_effects
            .iter()
            .filter(|(key, _)| key.entity == entity)
            .map(|(key, state)| (key.kind, *state))
            .collect();
        effects.sort_by_key(|(kind, _)| *kind);
        effects
    }

    pub fn stats(&self, entity: EntityId) -> Option<&CombatantRpgStats> {
        self.stats.get(&entity)
    }

    /// Every event appended so far, oldest first.
    pub fn events(&self) -> &[BattleEvent] {
        &self.event_log
    }

    /// Every entity known to any collection, ascending.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let ids: BTreeSet<EntityId> = self
            .teams
            .keys()
            .chain(self.positions.keys())
            .chain(self.hit_points.keys())
            .chain(self.movement_points.keys())
            .chain(self.skill_resources.keys())
            .chain(self.stats.keys())
            .copied()
            .collect();
        ids.into_iter().collect()
    }

    /// Living entities, ascending.
    pub fn living_entities(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .hit_points
            .iter()
            .filter(|(_, hp)| **hp > 0)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Lowest entity id standing on `position`, if any.
    pub fn occupant_at(&self, position: Position3) -> Option<EntityId> {
        self.positions
            .iter()
            .filter(|(_, pos)| **pos == position)
            .map(|(id, _)| *id)
            .min()
    }

    /// Positions of every entity except those listed, ascending by entity.
    pub fn positions_except(&self, excluded: &[EntityId]) -> Vec<(EntityId, Position3)> {
        let mut positions: Vec<_> = self
            .positions
            .iter()
            .filter(|(id, _)| !excluded.contains(id))
            .map(|(id, pos)| (*id, *pos))
            .collect();
        positions.sort_unstable_by_key(|(id, _)| *id);
        positions
    }

    // ========================================================================
    // Mutations (crate-private: commands and the resolver only)
    // ========================================================================

    pub(crate) fn advance_tick(&mut self) -> Tick {
        self.tick = self.tick.next();
        self.tick
    }

    pub(crate) fn push_event(&mut self, event: BattleEvent) {
        self.event_log.push(event);
    }

    pub(crate) fn set_position(&mut self, entity: EntityId, position: Position3) -> Option<Position3> {
        self.positions.insert(entity, position)
    }

    #[cfg(test)]
    pub(crate) fn set_hit_points(&mut self, entity: EntityId, hit_points: i32) {
        self.hit_points.insert(entity, hit_points);
    }

    #[cfg(test)]
    pub(crate) fn remove_hit_points(&mut self, entity: EntityId) {
        self.hit_points.remove(&entity);
    }

    /// Subtracts `amount` hit points, never going below zero.
    ///
    /// Returns the new hit points.
    pub(crate) fn apply_damage(&mut self, entity: EntityId, amount: i32) -> Result<i32, StateError> {
        if amount < 0 {
            return Err(StateError::NegativeAmount(amount));
        }
        let hp = self
            .hit_points
            .get_mut(&entity)
            .ok_or(StateError::MissingHitPoints(entity))?;
        *hp = hp.saturating_sub(amount).max(0);
        Ok(*hp)
    }

    /// Adds `amount` hit points, capped at `maximum` when one is known.
    pub(crate) fn heal(
        &mut self,
        entity: EntityId,
        amount: i32,
        maximum: Option<i32>,
    ) -> Result<i32, StateError> {
        if amount < 0 {
            return Err(StateError::NegativeAmount(amount));
        }
        let hp = self
            .hit_points
            .get_mut(&entity)
            .ok_or(StateError::MissingHitPoints(entity))?;
        let healed = hp.saturating_add(amount);
        *hp = match maximum {
            Some(max) => healed.min(max.max(*hp)),
            None => healed,
        };
        Ok(*hp)
    }

    /// Spends movement points. Entities without movement bookkeeping move freely.
    pub(crate) fn spend_movement_points(
        &mut self,
        entity: EntityId,
        amount: u32,
    ) -> Result<(), StateError> {
        let Some(points) = self.movement_points.get_mut(&entity) else {
            return Ok(());
        };
        if points.current < amount {
            return Err(StateError::InsufficientMovementPoints {
                entity,
                available: points.current,
                required: amount,
            });
        }
        points.current -= amount;
        Ok(())
    }

    pub(crate) fn refill_movement_points(&mut self, entity: EntityId) {
        if let Some(points) = self.movement_points.get_mut(&entity) {
            points.current = points.maximum;
        }
    }

    /// Consumes skill resource. A zero cost always succeeds.
    ///
    /// Returns the remaining amount.
    pub(crate) fn consume_skill_resource(
        &mut self,
        entity: EntityId,
        cost: i32,
    ) -> Result<i32, StateError> {
        if cost < 0 {
            return Err(StateError::NegativeAmount(cost));
        }
        if cost == 0 {
            return Ok(self.skill_resource(entity).unwrap_or(0));
        }
        let available = self
            .skill_resources
            .get_mut(&entity)
            .ok_or(StateError::MissingSkillResource(entity))?;
        if *available < cost {
            return Err(StateError::InsufficientSkillResource {
                entity,
                available: *available,
                required: cost,
            });
        }
        *available -= cost;
        Ok(*available)
    }

    /// Sets a cooldown; zero removes it.
    pub(crate) fn set_cooldown(&mut self, entity: EntityId, skill: SkillId, turns: u32) {
        let key = CooldownKey::new(entity, skill);
        if turns == 0 {
            self.cooldowns.remove(&key);
        } else {
            self.cooldowns.insert(key, turns);
        }
    }

    /// Decrements every cooldown of `entity`, removing those that reach zero.
    pub(crate) fn decrement_cooldowns(&mut self, entity: EntityId) {
        self.cooldowns.retain(|key, remaining| {
            if key.entity != entity {
                return true;
            }
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }

    /// Applies or refreshes a status effect.
    ///
    /// Re-applying keeps the longer remaining duration and takes the new
    /// potency and tick moment. A zero duration is ignored.
    pub(crate) fn apply_status(
        &mut self,
        entity: EntityId,
        kind: StatusEffectKind,
        incoming: StatusEffectState,
    ) {
        if incoming.remaining_turns == 0 {
            return;
        }
        let key = StatusKey::new(entity, kind);
        let merged = match self.status_effects.get(&key) {
            Some(existing) => StatusEffectState {
                remaining_turns: existing.remaining_turns.max(incoming.remaining_turns),
                ..incoming
            },
            None => incoming,
        };
        self.status_effects.insert(key, merged);
    }

    /// Decrements one status effect, removing it at zero.
    ///
    /// Returns the remaining turns.
    pub(crate) fn decrement_status(&mut self, entity: EntityId, kind: StatusEffectKind) -> u32 {
        let key = StatusKey::new(entity, kind);
        let Some(state) = self.status_effects.get_mut(&key) else {
            return 0;
        };
        state.remaining_turns = state.remaining_turns.saturating_sub(1);
        let remaining = state.remaining_turns;
        if remaining == 0 {
            self.status_effects.remove(&key);
        }
        remaining
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Exports the state with every collection sorted by its key.
    pub fn create_snapshot(&self) -> BattleStateSnapshot {
        let mut cooldowns: Vec<CooldownEntry> = self
            .cooldowns
            .iter()
            .map(|(key, remaining)| CooldownEntry {
                entity: key.entity,
                skill: key.skill,
                remaining_turns: *remaining,
            })
            .collect();
        cooldowns.sort_unstable_by_key(|e| (e.entity, e.skill));

        let mut status_effects: Vec<StatusEffectEntry> = self
            .status_effects
            .iter()
            .map(|(key, state)| StatusEffectEntry {
                entity: key.entity,
                kind: key.kind,
                state: *state,
            })
            .collect();
        status_effects.sort_unstable_by_key(|e| (e.entity, e.kind, e.state.tick_moment));

        BattleStateSnapshot {
            contract_version: BattleConfig::SNAPSHOT_CONTRACT_VERSION,
            tick: self.tick,
            teams: sorted_entries(&self.teams),
            positions: sorted_entries(&self.positions),
            hit_points: sorted_entries(&self.hit_points),
            movement_points: sorted_entries(&self.movement_points),
            skill_resources: sorted_entries(&self.skill_resources),
            cooldowns,
            status_effects,
            stats: sorted_entries(&self.stats),
        }
    }

    /// Replaces tick and every collection with the snapshot's content.
    ///
    /// The event log is left untouched. On error the state is unchanged.
    pub fn apply_snapshot(&mut self, snapshot: &BattleStateSnapshot) -> Result<(), StateError> {
        snapshot.validate()?;

        self.tick = snapshot.tick;
        self.teams = collect_entries(&snapshot.teams);
        self.positions = collect_entries(&snapshot.positions);
        self.hit_points = collect_entries(&snapshot.hit_points);
        self.movement_points = collect_entries(&snapshot.movement_points);
        self.skill_resources = collect_entries(&snapshot.skill_resources);
        self.cooldowns = snapshot
            .cooldowns
            .iter()
            .filter(|e| e.remaining_turns > 0)
            .map(|e| (CooldownKey::new(e.entity, e.skill), e.remaining_turns))
            .collect();
        self.status_effects = snapshot
            .status_effects
            .iter()
            .filter(|e| e.state.remaining_turns > 0)
            .map(|e| (StatusKey::new(e.entity, e.kind), e.state))
            .collect();
        self.stats = collect_entries(&snapshot.stats);
        Ok(())
    }
}

fn sorted_entries<T: Copy>(map: &HashMap<EntityId, T>) -> Vec<EntityValue<T>> {
    let mut entries: Vec<EntityValue<T>> = map
        .iter()
        .map(|(entity, value)| EntityValue::new(*entity, *value))
        .collect();
    entries.sort_unstable_by_key(|e| e.entity);
    entries
}

fn collect_entries<T: Copy>(entries: &[EntityValue<T>]) -> HashMap<EntityId, T> {
    entries.iter().map(|e| (e.entity, e.value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<ActorDefinition> {
        vec![
            ActorDefinition::new(EntityId(9), TeamId(2), Position3::new(4, 1, 0), 30, 5, 12)
                .with_skill_resource(10),
            ActorDefinition::new(EntityId(3), TeamId(1), Position3::new(0, 0, 1), 25, 4, 8)
                .with_stats(CombatantRpgStats {
                    rapidity: 8,
                    ..CombatantRpgStats::NEUTRAL
                }),
            ActorDefinition::new(EntityId(5), TeamId(1), Position3::new(1, 2, 0), 18, 3, 10),
        ]
    }

    fn busy_state() -> BattleState {
        let mut state = BattleState::from_roster(&roster());
        state.set_cooldown(EntityId(9), SkillId(4), 2);
        state.set_cooldown(EntityId(3), SkillId(7), 1);
        state.set_cooldown(EntityId(3), SkillId(2), 3);
        state.apply_status(
            EntityId(9),
            StatusEffectKind::Slow,
            StatusEffectState::new(2, 1, TickMoment::TurnEnd),
        );
        state.apply_status(
            EntityId(9),
            StatusEffectKind::Poison,
            StatusEffectState::new(3, 4, TickMoment::TurnStart),
        );
        state.spend_movement_points(EntityId(5), 2).unwrap();
        state.advance_tick();
        state.advance_tick();
        state
    }

    #[test]
    fn snapshot_collections_are_sorted_by_entity() {
        let snapshot = busy_state().create_snapshot();

        let ids: Vec<u32> = snapshot.positions.iter().map(|e| e.entity.0).collect();
        assert_eq!(ids, vec![3, 5, 9]);
        let cooldowns: Vec<(u32, u32)> = snapshot
            .cooldowns
            .iter()
            .map(|e| (e.entity.0, e.skill.0))
            .collect();
        assert_eq!(cooldowns, vec![(3, 2), (3, 7), (9, 4)]);
        let kinds: Vec<StatusEffectKind> = snapshot.status_effects.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![StatusEffectKind::Poison, StatusEffectKind::Slow]);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn snapshot_round_trip_restores_everything() {
        let original = busy_state();
        let snapshot = original.create_snapshot();

        let mut restored = BattleState::new();
        restored.apply_snapshot(&snapshot).unwrap();

        assert_eq!(restored.tick(), Tick(2));
        assert_eq!(restored.position(EntityId(9)), Some(Position3::new(4, 1, 0)));
        assert_eq!(restored.hit_points(EntityId(3)), Some(25));
        assert_eq!(
            restored.movement_points(EntityId(5)),
            Some(MovementPoints::new(1, 3))
        );
        assert_eq!(restored.skill_resource(EntityId(9)), Some(10));
        assert_eq!(restored.cooldown(EntityId(3), SkillId(2)), 3);
        assert_eq!(
            restored.status_effect(EntityId(9), StatusEffectKind::Poison),
            Some(StatusEffectState::new(3, 4, TickMoment::TurnStart))
        );
        assert_eq!(restored.stats(EntityId(3)).map(|s| s.rapidity), Some(8));
        assert_eq!(restored.create_snapshot(), snapshot);
        assert_eq!(restored.create_snapshot().digest(), snapshot.digest());
    }

    #[test]
    fn apply_snapshot_rejects_unknown_contract_version() {
        let mut snapshot = busy_state().create_snapshot();
        snapshot.contract_version = 99;

        let mut state = BattleState::new();
        let err = state.apply_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, StateError::UnsupportedContractVersion { found: 99, .. }));
        assert_eq!(state, BattleState::new());
    }

    #[test]
    fn apply_snapshot_rejects_unsorted_collections() {
        let mut snapshot = busy_state().create_snapshot();
        snapshot.hit_points.reverse();

        assert_eq!(
            BattleState::from_snapshot(&snapshot).unwrap_err(),
            StateError::UnsortedSnapshot
        );
    }

    #[test]
    fn digest_changes_with_content() {
        let state = busy_state();
        let before = state.create_snapshot().digest();

        let mut damaged = state.clone();
        damaged.apply_damage(EntityId(5), 1).unwrap();
        assert_ne!(damaged.create_snapshot().digest(), before);
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut state = BattleState::from_roster(&roster());
        assert_eq!(state.apply_damage(EntityId(5), 100), Ok(0));
        assert!(!state.is_alive(EntityId(5)));
        assert_eq!(
            state.apply_damage(EntityId(42), 1),
            Err(StateError::MissingHitPoints(EntityId(42)))
        );
    }

    #[test]
    fn cooldowns_count_down_per_owner() {
        let mut state = busy_state();
        state.decrement_cooldowns(EntityId(3));
        assert_eq!(state.cooldown(EntityId(3), SkillId(7)), 0);
        assert_eq!(state.cooldown(EntityId(3), SkillId(2)), 2);
        assert_eq!(state.cooldown(EntityId(9), SkillId(4)), 2);
    }

    #[test]
    fn reapplied_status_keeps_longer_duration() {
        let mut state = busy_state();
        state.apply_status(
            EntityId(9),
            StatusEffectKind::Poison,
            StatusEffectState::new(1, 9, TickMoment::TurnEnd),
        );
        assert_eq!(
            state.status_effect(EntityId(9), StatusEffectKind::Poison),
            Some(StatusEffectState::new(3, 9, TickMoment::TurnEnd))
        );
        assert_eq!(state.decrement_status(EntityId(9), StatusEffectKind::Slow), 1);
        assert_eq!(state.decrement_status(EntityId(9), StatusEffectKind::Slow), 0);
        assert_eq!(state.status_effect(EntityId(9), StatusEffectKind::Slow), None);
    }

    #[test]
    fn skill_resource_consumption() {
        let mut state = BattleState::from_roster(&roster());
        assert_eq!(state.consume_skill_resource(EntityId(9), 4), Ok(6));
        assert!(matches!(
            state.consume_skill_resource(EntityId(9), 7),
            Err(StateError::InsufficientSkillResource { available: 6, required: 7, .. })
        ));
        assert_eq!(
            state.consume_skill_resource(EntityId(5), 1),
            Err(StateError::MissingSkillResource(EntityId(5)))
        );
        assert_eq!(state.consume_skill_resource(EntityId(5), 0), Ok(0));
    }
}
