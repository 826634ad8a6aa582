//! Runtime settings
//!
//! Tunables for the player, doors and the frame loop. Stored as RON; every
//! field has a default so a settings file only needs the values it changes.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::info;
use crate::math::Vec3;
use crate::world::TILE_SIZE;

/// Error type for settings loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// First-person player tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Walk speed (units per second)
    pub speed: f32,
    /// Yaw per pixel of horizontal mouse travel, scaled by frame time
    pub turn_sensitivity: f32,
    /// Collision box half extents (x, y, z)
    pub half_extents: Vec3,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: 10.0,
            turn_sensitivity: 0.18,
            half_extents: Vec3::new(1.0, 2.0, 1.0),
        }
    }
}

/// Sliding door tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorSettings {
    /// Slide speed (units per second)
    pub speed: f32,
    /// Fully open offset, in tiles
    pub max_offset_factor: f32,
    /// Player distance that opens the door, in tiles
    pub trigger_radius_factor: f32,
}

impl Default for DoorSettings {
    fn default() -> Self {
        Self {
            speed: 5.0,
            max_offset_factor: 0.9,
            trigger_radius_factor: 0.75,
        }
    }
}

impl DoorSettings {
    pub fn max_offset(&self) -> f32 {
        self.max_offset_factor * TILE_SIZE
    }

    pub fn trigger_radius(&self) -> f32 {
        self.trigger_radius_factor * TILE_SIZE
    }
}

/// Frame loop tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Largest time step fed to integration (seconds). Longer frames are
    /// clamped so a hitch cannot carry an entity through a wall.
    pub max_frame_step: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self { max_frame_step: 0.05 }
    }
}

/// All runtime settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub door: DoorSettings,
    pub sim: SimSettings,
}

impl Settings {
    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("player.speed", self.player.speed),
            ("door.speed", self.door.speed),
            ("sim.max_frame_step", self.sim.max_frame_step),
            ("player.half_extents.x", self.player.half_extents.x),
            ("player.half_extents.y", self.player.half_extents.y),
            ("player.half_extents.z", self.player.half_extents.z),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!("{} must be positive, got {}", name, value)));
            }
        }
        let non_negative = [
            ("player.turn_sensitivity", self.player.turn_sensitivity),
            ("door.max_offset_factor", self.door.max_offset_factor),
            ("door.trigger_radius_factor", self.door.trigger_radius_factor),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!("{} must not be negative, got {}", name, value)));
            }
        }
        Ok(())
    }
}

/// Parse settings from a RON string
pub fn settings_from_str(s: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = ron::from_str(s)?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a RON file. A missing file gives the defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "settings file not found, using defaults");
        return Ok(Settings::default());
    }
    let contents = fs::read_to_string(path)?;
    let settings = settings_from_str(&contents)?;
    info!(path = %path.display(), "loaded settings");
    Ok(settings)
}
