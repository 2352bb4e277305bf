//! Repository contract for persisting replay records.

use tactics_core::ReplayRecord;

use crate::repository::{RepositoryError, Result};

/// Storage for finished (or in-progress) battle replays, keyed by id.
pub trait ReplayRepository: Send + Sync {
    fn save(&self, id: &str, record: &ReplayRecord) -> Result<()>;

    fn load(&self, id: &str) -> Result<Option<ReplayRecord>>;

    fn exists(&self, id: &str) -> bool;

    fn delete(&self, id: &str) -> Result<()>;

    /// Stored ids, ascending.
    fn list_ids(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

/// Ids double as file names, so they are restricted to a safe alphabet.
pub(crate) fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidId(id.to_owned()))
    }
}
