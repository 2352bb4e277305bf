//! Common error infrastructure for tactics-core.
//!
//! Gameplay rejections (out of range, on cooldown, ...) are never errors: they
//! are reported as [`crate::ActionResolution`] values and logged like any other
//! action. The error types in this crate cover programmer mistakes and broken
//! invariants only: an empty turn order, a snapshot with an unknown contract
//! version, a replay that cannot be re-executed.
//!
//! Each module defines its own error enum next to the code that raises it and
//! implements [`GameError`] so callers can classify failures uniformly.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative input.
    ///
    /// Examples: unknown entity passed to a store mutation
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: empty turn order, zero actions per turn
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: replay diverged from its recording
    Internal,

    /// Fatal error - the battle cannot continue.
    ///
    /// Examples: snapshot contract version not supported
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all tactics-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable identifiers suitable for metrics and tests
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
