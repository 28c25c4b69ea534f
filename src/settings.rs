//! Gameplay tuning
//!
//! Stored as JSON next to the game. Every field has a default, so a settings
//! file only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::animation::{ActionFrames, DEATH_FRAMES, ProjectileFrames};

/// Errors raised while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame table for {0} has an empty action")]
    EmptyFrames(&'static str),
}

/// Player character stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub size: f32,
    pub move_speed: f32,
    pub jump_speed: f32,
    /// Ticks a jump can rise for; rise height is `jump_speed * jump_height`
    pub jump_height: u32,
    pub health: i32,
    pub scratch_damage: i32,
    pub fire_damage: i32,
    pub fire_energy: u32,
    pub fire_cost: u32,
    /// Ticks per regenerated unit of fire energy
    pub fire_regen_delay: u32,
    pub projectile_speed: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            size: PLAYER_SIZE,
            move_speed: 2.0,
            jump_speed: 3.0,
            jump_height: 40,
            health: 500,
            scratch_damage: 100,
            fire_damage: 50,
            fire_energy: 70,
            fire_cost: 10,
            fire_regen_delay: UPDATE_TIME,
            projectile_speed: 4.0,
        }
    }
}

/// Patrolling enemy stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    pub size: f32,
    pub move_speed: f32,
    pub jump_speed: f32,
    pub jump_height: u32,
    pub health: i32,
    /// Damage dealt to the player on contact
    pub contact_damage: i32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            size: ENEMY_SIZE,
            move_speed: 1.0,
            jump_speed: 3.0,
            jump_height: 40,
            health: 100,
            contact_damage: 50,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation tick period
    pub tick_millis: u64,

    // === World ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub tile_size: f32,
    pub decoration_threshold: u32,
    pub winning_tiles: Vec<u32>,
    pub player_tile: u32,
    pub enemy_tile: u32,

    // === Actors ===
    pub player: PlayerStats,
    pub enemy: EnemyStats,
    pub projectile_size: f32,

    // === Animation ===
    pub player_frames: ActionFrames,
    pub enemy_frames: ActionFrames,
    pub death_frames: usize,
    pub projectile_frames: ProjectileFrames,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_millis: DEFAULT_TICK_MILLIS,

            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            tile_size: TILE_SIZE,
            decoration_threshold: DECORATION_THRESHOLD,
            winning_tiles: WINNING_TILES.to_vec(),
            player_tile: PLAYER_TILE,
            enemy_tile: SNAIL_TILE,

            player: PlayerStats::default(),
            enemy: EnemyStats::default(),
            projectile_size: PROJECTILE_SIZE,

            player_frames: ActionFrames::PLAYER,
            enemy_frames: ActionFrames::SNAIL,
            death_frames: DEATH_FRAMES,
            projectile_frames: ProjectileFrames::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Reject frame tables the animation code cannot cycle through
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.player_frames.is_valid() {
            return Err(SettingsError::EmptyFrames("player"));
        }
        if !self.enemy_frames.is_valid() {
            return Err(SettingsError::EmptyFrames("enemy"));
        }
        if self.death_frames == 0 {
            return Err(SettingsError::EmptyFrames("death"));
        }
        if self.projectile_frames.active == 0 || self.projectile_frames.dissipate == 0 {
            return Err(SettingsError::EmptyFrames("projectile"));
        }
        Ok(())
    }
}
