//! Errors surfaced by the session API.
//!
//! Gameplay failures are not errors: they come back as rejected
//! [`tactics_core::ActionResolution`]s. These variants cover misuse of the
//! session itself and persistence failures.
use thiserror::Error;

use tactics_core::{BattleOutcome, EntityId, TurnError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session configuration: {0}")]
    Config(String),

    #[error("roster is empty")]
    EmptyRoster,

    #[error("{0} appears more than once in the roster")]
    DuplicateActor(EntityId),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("battle is already over: {0:?}")]
    BattleOver(BattleOutcome),

    #[error("turn upkeep for {actor} is driven by the session")]
    SystemCommand { actor: EntityId },

    #[error("no active actor holds the turn")]
    NoActiveActor,

    #[error("replay recording is disabled for this session")]
    ReplayDisabled,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
