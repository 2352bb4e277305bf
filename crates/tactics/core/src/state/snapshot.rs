//! Deterministic, ordered export of the battle state.
//!
//! Every per-entity collection is sorted ascending by [`EntityId`], then by its
//! secondary key (skill id, effect type, tick moment). The ordering is part of
//! the wire contract: it is what makes two snapshots of equal states compare
//! equal and what makes replay verification deterministic.

use sha2::{Digest, Sha256};

use crate::config::BattleConfig;

use super::error::StateError;
use super::types::{
    CombatantRpgStats, EntityId, MovementPoints, Position3, SkillId, StatusEffectKind,
    StatusEffectState, TeamId, Tick,
};

/// A value owned by one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityValue<T> {
    pub entity: EntityId,
    pub value: T,
}

impl<T> EntityValue<T> {
    pub fn new(entity: EntityId, value: T) -> Self {
        Self { entity, value }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownEntry {
    pub entity: EntityId,
    pub skill: SkillId,
    pub remaining_turns: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectEntry {
    pub entity: EntityId,
    pub kind: StatusEffectKind,
    pub state: StatusEffectState,
}

/// Versioned, ordered copy of the full battle state at one tick.
///
/// The event log is not part of a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleStateSnapshot {
    pub contract_version: u32,
    pub tick: Tick,
    pub teams: Vec<EntityValue<TeamId>>,
    pub positions: Vec<EntityValue<Position3>>,
    pub hit_points: Vec<EntityValue<i32>>,
    pub movement_points: Vec<EntityValue<MovementPoints>>,
    pub skill_resources: Vec<EntityValue<i32>>,
    pub cooldowns: Vec<CooldownEntry>,
    pub status_effects: Vec<StatusEffectEntry>,
    pub stats: Vec<EntityValue<CombatantRpgStats>>,
}

impl BattleStateSnapshot {
    /// Empty snapshot at the current contract version.
    pub fn empty() -> Self {
        Self {
            contract_version: BattleConfig::SNAPSHOT_CONTRACT_VERSION,
            tick: Tick::ZERO,
            teams: Vec::new(),
            positions: Vec::new(),
            hit_points: Vec::new(),
            movement_points: Vec::new(),
            skill_resources: Vec::new(),
            cooldowns: Vec::new(),
            status_effects: Vec::new(),
            stats: Vec::new(),
        }
    }

    /// Checks the contract version and the ordering invariant.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.contract_version != BattleConfig::SNAPSHOT_CONTRACT_VERSION {
            return Err(StateError::UnsupportedContractVersion {
                found: self.contract_version,
                expected: BattleConfig::SNAPSHOT_CONTRACT_VERSION,
            });
        }

        let sorted = strictly_ascending(&self.teams, |e| e.entity)
            && strictly_ascending(&self.positions, |e| e.entity)
            && strictly_ascending(&self.hit_points, |e| e.entity)
            && strictly_ascending(&self.movement_points, |e| e.entity)
            && strictly_ascending(&self.skill_resources, |e| e.entity)
            && strictly_ascending(&self.cooldowns, |e| (e.entity, e.skill))
            && strictly_ascending(&self.status_effects, |e| {
                (e.entity, e.kind, e.state.tick_moment)
            })
            && strictly_ascending(&self.stats, |e| e.entity);

        if sorted {
            Ok(())
        } else {
            Err(StateError::UnsortedSnapshot)
        }
    }

    /// SHA-256 over a canonical little-endian encoding of every field.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.contract_version.to_le_bytes());
        hasher.update(self.tick.0.to_le_bytes());

        hasher.update((self.teams.len() as u64).to_le_bytes());
        for entry in &self.teams {
            hasher.update(entry.entity.0.to_le_bytes());
            hasher.update(entry.value.0.to_le_bytes());
        }

        hasher.update((self.positions.len() as u64).to_le_bytes());
        for entry in &self.positions {
            hasher.update(entry.entity.0.to_le_bytes());
            hasher.update(entry.value.x.to_le_bytes());
            hasher.update(entry.value.y.to_le_bytes());
            hasher.update(entry.value.z.to_le_bytes());
        }

        hasher.update((self.hit_points.len() as u64).to_le_bytes());
        for entry in &self.hit_points {
            hasher.update(entry.entity.0.to_le_bytes());
            hasher.update(entry.value.to_le_bytes());
        }

        hasher.update((self.movement_points.len() as u64).to_le_bytes());
        for entry in &self.movement_points {
            hasher.update(entry.entity.0.to_le_bytes());
            hasher.update(entry.value.current.to_le_bytes());
            hasher.update(entry.value.maximum.to_le_bytes());
        }

        hasher.update((self.skill_resources.len() as u64).to_le_bytes());
        for entry in &self.skill_resources {
            hasher.update(entry.entity.0.to_le_bytes());
            hasher.update(entry.value.to_le_bytes());
        }

        hasher.update((self.cooldowns.len() as u64).to_le_bytes());
        for entry in &self.cooldowns {
            hasher.update(entry.entity.0.to_le_bytes());
            hasher.update(entry.skill.0.to_le_bytes());
            hasher.update(entry.remaining_turns.to_le_bytes());
        }

        hasher.update((self.status_effects.len() as u64).to_le_bytes());
        for entry in &self.status_effects {
            hasher.update(entry.entity.0.to_le_bytes());
            hasher.update([entry.kind as u8, entry.state.tick_moment as u8]);
            hasher.update(entry.state.remaining_turns.to_le_bytes());
            hasher.update(entry.state.potency.to_le_bytes());
        }

        hasher.update((self.stats.len() as u64).to_le_bytes());
        for entry in &self.stats {
            hasher.update(entry.entity.0.to_le_bytes());
            hash_stats(&mut hasher, &entry.value);
        }

        hasher.finalize().into()
    }
}

fn hash_stats(hasher: &mut Sha256, stats: &CombatantRpgStats) {
    for scalar in [
        stats.action_points,
        stats.movement_points,
        stats.range,
        stats.elevation,
        stats.summon_capacity,
        stats.hit_points,
        stats.assiduity,
        stats.rapidity,
        stats.critical_chance,
        stats.critical_damage,
        stats.critical_resistance,
    ] {
        hasher.update(scalar.to_le_bytes());
    }
    for vector in [
        &stats.attack,
        &stats.power,
        &stats.defense,
        &stats.resistance,
    ] {
        for value in vector.as_slice() {
            hasher.update(value.to_le_bytes());
        }
    }
}

fn strictly_ascending<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> bool {
    items.windows(2).all(|pair| key(&pair[0]) < key(&pair[1]))
}
