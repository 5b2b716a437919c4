//! Simulation configuration with documented constants
//!
//! Every tunable number of the movement, navigation, camera and streaming
//! systems lives here. All sections deserialize from TOML with defaults, so a
//! config file only needs the values it changes:
//!
//! ```toml
//! seed = 7
//!
//! [navigation]
//! recalculate_interval = 0.5
//!
//! [camera]
//! min_speed = 6.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{OverworldError, Result};
use crate::core::types::Vector2;

/// Configuration for the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for random destination picking and generated maps
    pub seed: u64,
    pub movement: MovementConfig,
    pub navigation: NavigationConfig,
    pub camera: CameraConfig,
    pub streaming: StreamingConfig,
    pub world: WorldConfig,
}

/// Character kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Velocity gained per second on an axis with active intent (tiles/s²)
    ///
    /// Also used as friction on axes without intent. At 200 a character
    /// reaches the player cap of 10 tiles/s in 0.05 s.
    pub acceleration: f32,

    /// Per-axis speed cap for the player (tiles/s)
    pub player_max_speed: f32,

    /// Per-axis speed cap for autonomous agents (tiles/s)
    pub agent_max_speed: f32,

    /// Sprite footprint of every character in tiles
    pub character_size: Vector2,
}

/// Path planning and path following
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Seconds between replans of a follower
    pub recalculate_interval: f32,

    /// Distance at which a waypoint counts as reached (tiles)
    pub arrival_tolerance: f32,

    /// Per-axis delta below which no steering is applied (tiles)
    ///
    /// Must stay below `arrival_tolerance`, otherwise a follower can stop
    /// short of a waypoint it never pops.
    pub dead_zone: f32,

    /// Multiplier on the Euclidean heuristic of the grid search
    ///
    /// Values at or below 1.0 keep the search optimal on a 4-connected grid.
    pub heuristic_weight: f32,
}

/// Viewport pursuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Floor speed of camera pursuit (tiles/s)
    pub min_speed: f32,

    /// Pixel size of one tile on screen
    pub tile_size: f32,

    /// Screen width in pixels
    pub screen_width: f32,

    /// Screen height in pixels
    pub screen_height: f32,
}

/// Render area sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Extra tiles kept alive beyond the visible viewport on every side
    pub margin: i32,
}

/// Headless world setup used by the runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of autonomous agents to spawn
    pub agent_count: usize,

    /// Width of generated maps in tiles
    pub width: usize,

    /// Height of generated maps in tiles
    pub height: usize,

    /// Fraction of generated tiles that are rock
    pub rock_density: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            movement: MovementConfig::default(),
            navigation: NavigationConfig::default(),
            camera: CameraConfig::default(),
            streaming: StreamingConfig::default(),
            world: WorldConfig::default(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            acceleration: 200.0,
            player_max_speed: 10.0,
            agent_max_speed: 1.75,
            character_size: Vector2::new(2.0, 2.0),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            recalculate_interval: 1.0,
            arrival_tolerance: 0.25,
            dead_zone: 0.05,
            heuristic_weight: 0.5,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_speed: 4.0,
            tile_size: 48.0,
            screen_width: 1280.0,
            screen_height: 720.0,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self { margin: 2 }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            agent_count: 4,
            width: 64,
            height: 64,
            rock_density: 0.15,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values the systems cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("movement.acceleration", self.movement.acceleration),
            ("movement.player_max_speed", self.movement.player_max_speed),
            ("movement.agent_max_speed", self.movement.agent_max_speed),
            ("movement.character_size.x", self.movement.character_size.x),
            ("movement.character_size.y", self.movement.character_size.y),
            ("navigation.recalculate_interval", self.navigation.recalculate_interval),
            ("navigation.arrival_tolerance", self.navigation.arrival_tolerance),
            ("camera.min_speed", self.camera.min_speed),
            ("camera.tile_size", self.camera.tile_size),
            ("camera.screen_width", self.camera.screen_width),
            ("camera.screen_height", self.camera.screen_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(OverworldError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..self.navigation.arrival_tolerance).contains(&self.navigation.dead_zone) {
            return Err(OverworldError::InvalidConfig(format!(
                "navigation.dead_zone must be in [0, arrival_tolerance), got {}",
                self.navigation.dead_zone
            )));
        }
        if !(self.navigation.heuristic_weight >= 0.0) {
            return Err(OverworldError::InvalidConfig(
                "navigation.heuristic_weight must not be negative".to_string(),
            ));
        }
        if self.streaming.margin < 0 {
            return Err(OverworldError::InvalidConfig(
                "streaming.margin must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.world.rock_density) {
            return Err(OverworldError::InvalidConfig(format!(
                "world.rock_density must be in [0, 1], got {}",
                self.world.rock_density
            )));
        }
        Ok(())
    }
}
