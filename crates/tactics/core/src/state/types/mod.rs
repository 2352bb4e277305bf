mod common;
mod roster;
mod stats;
mod status;

pub use common::{EntityId, MovementPoints, Position3, SkillId, TeamId, Tick};
pub use roster::ActorDefinition;
pub use stats::{CombatantRpgStats, DamageElement, ElementVector};
pub use status::{CooldownKey, StatusEffectKind, StatusEffectState, StatusKey, TickMoment};
