//! Run configuration.
//!
//! Every tunable of a run in one serde-friendly struct. Each section lives
//! next to the system it configures; this module only gathers them and
//! handles loading (JSON file, environment overrides) and validation.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::combat::CombatConfig;
use crate::game::essence::EssenceConfig;
use crate::game::room::RoomConfig;
use crate::game::totem::TotemConfig;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x7073_6d65_746f_7421;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Values are out of range or inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Full configuration for a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Run seed
    pub seed: u64,
    /// Totem matching
    pub totem: TotemConfig,
    /// Combat numbers
    pub combat: CombatConfig,
    /// Essence caps
    pub essence: EssenceConfig,
    /// Run generation and traversal
    pub room: RoomConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            totem: TotemConfig::default(),
            combat: CombatConfig::default(),
            essence: EssenceConfig::default(),
            room: RoomConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load from environment variables.
    ///
    /// `TOTEM_RUN_CONFIG` names a JSON file used as the base (defaults
    /// otherwise). `TOTEM_RUN_SEED` and `TOTEM_RUN_MAX_ESSENCE` override
    /// single fields on top of it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("TOTEM_RUN_CONFIG") {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(seed) = std::env::var("TOTEM_RUN_SEED") {
            config.seed = parse_env("TOTEM_RUN_SEED", &seed)?;
        }
        if let Ok(max) = std::env::var("TOTEM_RUN_MAX_ESSENCE") {
            config.essence.max_essence = parse_env("TOTEM_RUN_MAX_ESSENCE", &max)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let room = &self.room;
        if room.min_rooms < 2 {
            return Err(invalid("room.min_rooms must be at least 2"));
        }
        if room.min_rooms > room.max_rooms {
            return Err(invalid("room.min_rooms exceeds room.max_rooms"));
        }
        if room.min_rest_index > room.max_rest_index {
            return Err(invalid("room.min_rest_index exceeds room.max_rest_index"));
        }
        if room.max_rest_index + 1 >= room.min_rooms {
            return Err(invalid("rest room must come before the boss room"));
        }
        if !(room.portal_reach > 0.0) {
            return Err(invalid("room.portal_reach must be positive"));
        }

        if self.essence.max_essence == 0 {
            return Err(invalid("essence.max_essence must be positive"));
        }

        let combat = &self.combat;
        if combat.player_max_health == 0 {
            return Err(invalid("combat.player_max_health must be positive"));
        }
        if combat.contact_cooldown_ms == 0 {
            return Err(invalid("combat.contact_cooldown_ms must be positive"));
        }
        if !(combat.player_attack_range > 0.0) || !(combat.contact_radius >= 0.0) {
            return Err(invalid("combat ranges must be positive"));
        }

        if !(self.totem.interact_distance > 0.0) {
            return Err(invalid("totem.interact_distance must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name}={value:?} is not a valid number")))
}
