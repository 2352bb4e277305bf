//! Targeting services: range, elevation and line-of-sight gates.
//!
//! Targeting is read-only. Each service returns a report describing the
//! geometry of a valid target, or the [`crate::action::Rejection`] of the
//! first failing gate.
pub mod basic;
pub mod line;
pub mod skill;

pub use basic::{BasicTargetReport, evaluate_basic_attack};
pub use line::line_samples;
pub use skill::{SkillTargetReport, effective_max_range, evaluate_skill};
