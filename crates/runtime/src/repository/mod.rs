//! Repository layer for battle replays.
//!
//! Replays are the only data a session persists: the record alone (seed,
//! initial snapshot, commands, per-step snapshots) is enough to rebuild and
//! verify the battle. Maps and rosters stay with the caller.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileReplayRepository;
pub use memory::InMemoryReplayRepository;
pub use traits::ReplayRepository;
