//! Outcome values produced by every action.
//!
//! Gameplay failures are not errors. A rejected or missed action still yields
//! a fully formed [`ActionResolution`], which the resolver logs and attributes
//! to a tick exactly like a success.

use strum::IntoStaticStr;

use crate::config::BattleConfig;

/// Coarse outcome of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionCode {
    Succeeded,
    Missed,
    Rejected,
}

impl ResolutionCode {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Why an action did not succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum FailureReason {
    #[default]
    None,
    InvalidPolicy,
    InvalidOrigin,
    ActorDefeated,
    TargetDefeated,
    MissingHitPoints,
    MissingPositions,
    TooClose,
    OutOfRange,
    LineOfSightBlocked,
    SelfTargeting,
    InvalidTargeting,
    SkillOnCooldown,
    SkillResourceInsufficient,
    BlockedPath,
    DestinationOccupied,
    DestinationBlocked,
    VerticalStepTooHigh,
    MovementBudgetExceeded,
    MovementPointsInsufficient,
    NoMovement,
    DamageApplicationFailed,
    TurnTimedOut,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Small structured attachment to a resolution (damage dealt, cooldown left,
/// resource shortfall, ...).
///
/// Decoding routes through [`ResolutionPayload::with_schema_version`], so a
/// missing, zero or future `schema_version` reads as the current version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawResolutionPayload"))]
pub struct ResolutionPayload {
    pub kind: String,
    pub value1: i32,
    pub value2: i32,
    pub value3: i32,
    pub schema_version: u32,
}

impl ResolutionPayload {
    pub fn new(kind: impl Into<String>, value1: i32, value2: i32, value3: i32) -> Self {
        Self {
            kind: kind.into(),
            value1,
            value2,
            value3,
            schema_version: BattleConfig::PAYLOAD_SCHEMA_VERSION,
        }
    }

    /// Single-value payload.
    pub fn single(kind: impl Into<String>, value: i32) -> Self {
        Self::new(kind, value, 0, 0)
    }

    /// Overrides the schema version. Zero or versions newer than the current
    /// one are not representable and fall back to the current version.
    #[must_use]
    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = if version == 0 || version > BattleConfig::PAYLOAD_SCHEMA_VERSION {
            BattleConfig::PAYLOAD_SCHEMA_VERSION
        } else {
            version
        };
        self
    }
}

/// Wire form of [`ResolutionPayload`] before version normalization.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawResolutionPayload {
    kind: String,
    value1: i32,
    value2: i32,
    value3: i32,
    #[serde(default)]
    schema_version: u32,
}

#[cfg(feature = "serde")]
impl From<RawResolutionPayload> for ResolutionPayload {
    fn from(raw: RawResolutionPayload) -> Self {
        Self::new(raw.kind, raw.value1, raw.value2, raw.value3)
            .with_schema_version(raw.schema_version)
    }
}

/// Result of resolving one action.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResolution {
    pub success: bool,
    pub code: ResolutionCode,
    pub description: String,
    pub failure_reason: FailureReason,
    pub payload: Option<ResolutionPayload>,
}

impl ActionResolution {
    pub fn succeeded(description: impl Into<String>) -> Self {
        Self {
            success: true,
            code: ResolutionCode::Succeeded,
            description: description.into(),
            failure_reason: FailureReason::None,
            payload: None,
        }
    }

    pub fn missed(description: impl Into<String>) -> Self {
        Self {
            success: false,
            code: ResolutionCode::Missed,
            description: description.into(),
            failure_reason: FailureReason::None,
            payload: None,
        }
    }

    pub fn rejected(reason: FailureReason, description: impl Into<String>) -> Self {
        Self {
            success: false,
            code: ResolutionCode::Rejected,
            description: description.into(),
            failure_reason: reason,
            payload: None,
        }
    }

    /// Attaches a payload (builder pattern).
    #[must_use]
    pub fn with_payload(mut self, payload: ResolutionPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn is_rejected(&self) -> bool {
        self.code == ResolutionCode::Rejected
    }

    /// Payload value by position, when present.
    pub fn payload_value(&self, index: usize) -> Option<i32> {
        let payload = self.payload.as_ref()?;
        match index {
            1 => Some(payload.value1),
            2 => Some(payload.value2),
            3 => Some(payload.value3),
            _ => None,
        }
    }
}

/// A failed gate inside a command: the reason, a description, and an
/// optional payload. Converts into a rejected [`ActionResolution`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub reason: FailureReason,
    pub description: String,
    pub payload: Option<ResolutionPayload>,
}

impl Rejection {
    pub fn new(reason: FailureReason, description: impl Into<String>) -> Self {
        Self {
            reason,
            description: description.into(),
            payload: None,
        }
    }

    /// Attaches a payload (builder pattern).
    #[must_use]
    pub fn with_payload(mut self, payload: ResolutionPayload) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl From<Rejection> for ActionResolution {
    fn from(rejection: Rejection) -> Self {
        Self {
            success: false,
            code: ResolutionCode::Rejected,
            description: rejection.description,
            failure_reason: rejection.reason,
            payload: rejection.payload,
        }
    }
}
