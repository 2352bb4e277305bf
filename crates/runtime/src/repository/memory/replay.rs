//! In-memory ReplayRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tactics_core::ReplayRecord;

use crate::repository::traits::validate_id;
use crate::repository::{ReplayRepository, RepositoryError, Result};

#[derive(Default)]
pub struct InMemoryReplayRepository {
    records: RwLock<BTreeMap<String, ReplayRecord>>,
}

impl InMemoryReplayRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayRepository for InMemoryReplayRepository {
    fn save(&self, id: &str, record: &ReplayRecord) -> Result<()> {
        validate_id(id)?;
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.insert(id.to_owned(), record.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<ReplayRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    fn exists(&self, id: &str) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(id))
            .unwrap_or(false)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.remove(id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.keys().cloned().collect())
    }
}
