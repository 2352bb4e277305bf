//! File-based ReplayRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use tactics_core::ReplayRecord;

use crate::repository::traits::validate_id;
use crate::repository::{ReplayRepository, RepositoryError, Result};

/// File-based implementation of ReplayRepository.
///
/// Each replay lives in `replay_{id}.bin` (bincode). Writes go through a
/// temporary file and an atomic rename, so a crash never leaves a truncated
/// record behind. [`Self::export_json`] writes a `replay_{id}.json` sibling
/// for external tooling.
pub struct FileReplayRepository {
    base_dir: PathBuf,
}

impl FileReplayRepository {
    /// Create a new file-based replay repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn replay_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("replay_{id}.bin"))
    }

    /// Writes the stored replay as pretty JSON next to its binary form.
    ///
    /// Returns the JSON path, or `None` when no replay has that id.
    pub fn export_json(&self, id: &str) -> Result<Option<PathBuf>> {
        let Some(record) = self.load(id)? else {
            return Ok(None);
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;

        let path = self.base_dir.join(format!("replay_{id}.json"));
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::info!(id, path = %path.display(), "exported replay as JSON");
        Ok(Some(path))
    }
}

impl ReplayRepository for FileReplayRepository {
    fn save(&self, id: &str, record: &ReplayRecord) -> Result<()> {
        validate_id(id)?;
        let path = self.replay_path(id);
        let temp_path = path.with_extension("bin.tmp");

        let bytes = bincode::serialize(record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(id, steps = record.len(), "saved replay to {}", path.display());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<ReplayRecord>> {
        validate_id(id)?;
        let path = self.replay_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
        let record: ReplayRecord = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        record
            .validate()
            .map_err(|e| RepositoryError::CorruptedData(format!("replay {id}: {e}")))?;

        tracing::debug!(id, steps = record.len(), "loaded replay from {}", path.display());
        Ok(Some(record))
    }

    fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.replay_path(id).exists()
    }

    fn delete(&self, id: &str) -> Result<()> {
        validate_id(id)?;
        let path = self.replay_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!(id, "deleted replay");
        }
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(id) = filename
                    .strip_prefix("replay_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && validate_id(id).is_ok()
            {
                ids.push(id.to_owned());
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }
}
