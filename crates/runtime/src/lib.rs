//! Runtime orchestration for deterministic tactical battles.
//!
//! This crate wraps the pure rules in `tactics-core` with the pieces a running
//! battle needs: a [`BattleSession`] that enforces turn order and drives
//! upkeep, a [`SessionConfig`] loaded from JSON, and repositories that persist
//! replay records.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the orchestrator
//! - [`config`] and [`error`] define the session surface
//! - [`repository`] persists replays (bincode files or memory)
pub mod config;
pub mod error;
pub mod repository;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use repository::{
    FileReplayRepository, InMemoryReplayRepository, ReplayRepository, RepositoryError,
};
pub use session::{BattleSession, SessionStep};
