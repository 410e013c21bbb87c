//! Simulation configuration
//!
//! Every tunable constant of the simulation lives here, grouped per actor.
//! Configs are RON files; missing fields keep their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTuning {
    /// World size of one block
    pub block_size: f32,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self { block_size: 3.0 }
    }
}

/// Player tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Seconds to move one block
    pub move_time: f32,
    /// Starting lives
    pub lives: u32,
    /// Seconds of invulnerability after a hit
    pub invulnerability_time: f32,
    /// Half size of the box that digs micro-cells
    pub dig_half_extent: f32,
    /// Half size of the box used for contact with enemies, fire and rocks
    pub collision_half_extent: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_time: 0.18,
            lives: 3,
            invulnerability_time: 2.0,
            dig_half_extent: 1.35,
            collision_half_extent: 1.2,
        }
    }
}

/// Shared enemy tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Seconds to move one block
    pub move_time: f32,
    /// Ghost drift speed (world units per second)
    pub ghost_speed: f32,
    /// Seconds without a completed move before turning into a ghost
    pub stuck_threshold: f32,
    /// Per-tick chance of turning into a ghost while idle
    pub ghost_chance: f32,
    /// Minimum seconds spent as a ghost
    pub min_ghost_duration: f32,
    /// Distance to a block center at which a ghost may materialize
    pub ghost_exit_radius: f32,
    /// Wander circle radius
    pub wander_radius: f32,
    /// Wander jitter per tick
    pub wander_jitter: f32,
    /// Pumps needed to pop an enemy
    pub pumps_to_kill: u32,
    /// Seconds per deflation step
    pub deflate_rate: f32,
    /// Scale added per pump
    pub inflate_scale_step: f32,
    /// Upper bound of the random delay before the first decision
    pub max_wake_delay: f32,
    /// Half size of the collision box
    pub collision_half_extent: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            move_time: 0.25,
            ghost_speed: 2.0,
            stuck_threshold: 4.0,
            ghost_chance: 0.002,
            min_ghost_duration: 2.0,
            ghost_exit_radius: 0.2,
            wander_radius: 3.0,
            wander_jitter: 1.0,
            pumps_to_kill: 4,
            deflate_rate: 0.5,
            inflate_scale_step: 0.3,
            max_wake_delay: 0.5,
            collision_half_extent: 1.2,
        }
    }
}

/// Fygar fire attack tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FygarTuning {
    /// Maximum row distance to the player (blocks)
    pub attack_range: i32,
    /// Maximum fire length (blocks)
    pub fire_length: i32,
    /// Seconds of charging before fire
    pub charge_time: f32,
    /// Seconds the fire lasts (and the Fygar waits)
    pub fire_duration: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    /// Period of the charge warning blink
    pub flash_period: f32,
}

impl Default for FygarTuning {
    fn default() -> Self {
        Self {
            attack_range: 3,
            fire_length: 3,
            charge_time: 1.0,
            fire_duration: 0.5,
            attack_cooldown: 3.0,
            flash_period: 0.2,
        }
    }
}

/// Rock tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockTuning {
    /// Seconds of wobbling before the fall
    pub wobble_duration: f32,
    /// Horizontal wobble amplitude
    pub wobble_amplitude: f32,
    /// Fall speed (world units per second)
    pub fall_speed: f32,
    /// Seconds a settled rock stays before crumbling
    pub settle_delay: f32,
    /// Half size of the crush box
    pub collision_half_extent: f32,
}

impl Default for RockTuning {
    fn default() -> Self {
        Self {
            wobble_duration: 1.2,
            wobble_amplitude: 0.05,
            fall_speed: 4.0,
            settle_delay: 0.2,
            collision_half_extent: 1.2,
        }
    }
}

/// Pump tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpTuning {
    /// Reach in blocks
    pub range: f32,
    /// Tip speed (world units per second)
    pub shoot_speed: f32,
    /// Radius of the tip hit test
    pub tip_radius: f32,
    /// Seconds from retract to idle
    pub retract_delay: f32,
}

impl Default for PumpTuning {
    fn default() -> Self {
        Self {
            range: 3.0,
            shoot_speed: 15.0,
            tip_radius: 0.15,
            retract_delay: 0.05,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed ticks per second
    pub tick_rate: u32,
    /// Seed for every random decision
    pub seed: u64,
    /// Grid settings
    pub grid: GridTuning,
    /// Player settings
    pub player: PlayerTuning,
    /// Enemy settings
    pub enemy: EnemyTuning,
    /// Fygar settings
    pub fygar: FygarTuning,
    /// Rock settings
    pub rock: RockTuning,
    /// Pump settings
    pub pump: PumpTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            seed: 0,
            grid: GridTuning::default(),
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            fygar: FygarTuning::default(),
            rock: RockTuning::default(),
            pump: PumpTuning::default(),
        }
    }
}

impl SimConfig {
    /// Set the RNG seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the tick rate (clamped to at least 1)
    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate.max(1);
        self
    }

    /// Set the block size
    #[must_use]
    pub fn with_block_size(mut self, block_size: f32) -> Self {
        self.grid.block_size = block_size;
        self
    }

    /// Replace the enemy tuning
    #[must_use]
    pub fn with_enemy(mut self, enemy: EnemyTuning) -> Self {
        self.enemy = enemy;
        self
    }

    /// Replace the player tuning
    #[must_use]
    pub fn with_player(mut self, player: PlayerTuning) -> Self {
        self.player = player;
        self
    }

    /// Fixed tick length in seconds
    #[must_use]
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Parse a config from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the RON is not a valid config
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Errors that can occur while reading or writing config files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SimConfig::default()
            .with_seed(9)
            .with_tick_rate(0)
            .with_block_size(2.0);

        assert_eq!(config.seed, 9);
        assert_eq!(config.tick_rate, 1);
        assert_eq!(config.grid.block_size, 2.0);
        assert_eq!(config.tick_seconds(), 1.0);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = SimConfig::from_ron_str("(seed: 5, enemy: (pumps_to_kill: 2))").unwrap();

        assert_eq!(config.seed, 5);
        assert_eq!(config.enemy.pumps_to_kill, 2);
        assert_eq!(config.enemy.move_time, 0.25);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.fygar, FygarTuning::default());
    }

    #[test]
    fn test_config_ron_round_trip() {
        let config = SimConfig::default().with_seed(77);
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(SimConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_ron_is_an_error() {
        assert!(matches!(
            SimConfig::from_ron_str("(seed: \"nope\")"),
            Err(ConfigError::Deserialize(_))
        ));
        assert!(matches!(
            SimConfig::load_ron("/nonexistent/config.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
