//! Errors raised by battle state mutations and snapshot restore.

use crate::error::{ErrorSeverity, GameError};

use super::types::EntityId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    #[error("entity {0} has no hit points entry")]
    MissingHitPoints(EntityId),

    #[error("entity {0} has no skill resource entry")]
    MissingSkillResource(EntityId),

    #[error("entity {entity} has {available} skill resource, {required} required")]
    InsufficientSkillResource {
        entity: EntityId,
        available: i32,
        required: i32,
    },

    #[error("entity {entity} has {available} movement points, {required} required")]
    InsufficientMovementPoints {
        entity: EntityId,
        available: u32,
        required: u32,
    },

    #[error("negative amount {0} is not allowed")]
    NegativeAmount(i32),

    #[error("snapshot contract version {found} is not supported (expected {expected})")]
    UnsupportedContractVersion { found: u32, expected: u32 },

    #[error("snapshot collections are not sorted by entity id")]
    UnsortedSnapshot,
}

impl GameError for StateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingHitPoints(_) | Self::MissingSkillResource(_) => ErrorSeverity::Recoverable,
            Self::InsufficientSkillResource { .. } | Self::InsufficientMovementPoints { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::NegativeAmount(_) => ErrorSeverity::Validation,
            Self::UnsupportedContractVersion { .. } | Self::UnsortedSnapshot => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingHitPoints(_) => "STATE_MISSING_HIT_POINTS",
            Self::MissingSkillResource(_) => "STATE_MISSING_SKILL_RESOURCE",
            Self::InsufficientSkillResource { .. } => "STATE_INSUFFICIENT_SKILL_RESOURCE",
            Self::InsufficientMovementPoints { .. } => "STATE_INSUFFICIENT_MOVEMENT_POINTS",
            Self::NegativeAmount(_) => "STATE_NEGATIVE_AMOUNT",
            Self::UnsupportedContractVersion { .. } => "STATE_UNSUPPORTED_CONTRACT_VERSION",
            Self::UnsortedSnapshot => "STATE_UNSORTED_SNAPSHOT",
        }
    }
}
