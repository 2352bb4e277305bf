//! Session configuration.
//!
//! [`SessionConfig`] bundles the core [`BattleConfig`] with the knobs that only
//! matter to a running session: the RNG seed, the per-turn time limit and
//! whether a replay is recorded. It deserializes from JSON with every field
//! optional.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tactics_core::BattleConfig;

use crate::error::{Result, SessionError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub battle: BattleConfig,
    /// Seed for the battle RNG; the same seed replays the same battle.
    pub seed: u64,
    /// Turn time limit in seconds. `None` disables timeouts.
    pub turn_time_limit_secs: Option<u64>,
    pub record_replay: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            seed: 0,
            turn_time_limit_secs: None,
            record_replay: true,
        }
    }
}

impl SessionConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SessionError::Config(e.to_string()))
    }

    #[must_use]
    pub fn with_actions_per_turn(mut self, actions_per_turn: u32) -> Self {
        self.battle.actions_per_turn = actions_per_turn;
        self
    }

    #[must_use]
    pub fn with_turn_time_limit(mut self, limit: Duration) -> Self {
        self.turn_time_limit_secs = Some(limit.as_secs());
        self
    }

    #[must_use]
    pub fn without_replay(mut self) -> Self {
        self.record_replay = false;
        self
    }

    pub fn turn_time_limit(&self) -> Option<Duration> {
        self.turn_time_limit_secs.map(Duration::from_secs)
    }
}
