use crate::action::{ActionResolution, FailureReason, ResolutionCode, ResolutionPayload};

use super::types::Tick;

/// One entry of the battle event log, appended by the resolver for every
/// attempted action.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleEvent {
    pub tick: Tick,
    pub code: ResolutionCode,
    pub description: String,
    pub failure_reason: FailureReason,
    pub payload: Option<ResolutionPayload>,
}

impl BattleEvent {
    pub fn from_resolution(tick: Tick, resolution: &ActionResolution) -> Self {
        Self {
            tick,
            code: resolution.code,
            description: resolution.description.clone(),
            failure_reason: resolution.failure_reason,
            payload: resolution.payload.clone(),
        }
    }
}
