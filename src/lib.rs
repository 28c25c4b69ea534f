//! Dragon Platformer - a tile-based side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile collision, actor state machine, attacks)
//! - `settings`: Data-driven gameplay tuning, loaded from JSON
//!
//! Rendering, audio and menus are collaborators outside this crate; they read
//! the published [`sim::GameState`] snapshot and feed [`sim::InputEvent`]s back in.

pub mod logging;
pub mod settings;
pub mod sim;

pub use logging::init as init_logging;
pub use settings::{EnemyStats, PlayerStats, Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Ticks between animation frame advances
    pub const UPDATE_TIME: u32 = 15;
    /// Projectiles animate twice as fast as actors
    pub const PROJECTILE_FRAME_TICKS: u32 = UPDATE_TIME / 2;
    /// Death animation length, in frame advances
    pub const DEATH_TIME: u32 = 10;
    /// Flinch overlay length, in frame advances (flinch, blank, flinch, blank)
    pub const FLINCH_STEPS: u8 = 4;

    /// Default tick period
    pub const DEFAULT_TICK_MILLIS: u64 = 10;

    /// Default viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 1000.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Entity and tile sizes
    pub const TILE_SIZE: f32 = 50.0;
    pub const PLAYER_SIZE: f32 = 80.0;
    pub const ENEMY_SIZE: f32 = 50.0;
    pub const PROJECTILE_SIZE: f32 = 25.0;
    /// How far actors start sunk into the floor tile, so the middle foot
    /// sample keeps touching it across tile seams
    pub const FOOTING: f32 = 1.0;

    /// Fraction of the viewport width that forms the scroll band around the center
    pub const CENTER_BAND_FRACTION: f32 = 1.0 / 6.0;

    /// Tile ids with special meaning in map files
    pub const BLANK_TILE: u32 = 0;
    pub const PLAYER_TILE: u32 = 25;
    pub const SNAIL_TILE: u32 = 26;
    pub const WINNING_TILES: [u32; 2] = [15, 16];
    /// Ids below this are decoration and never collide
    pub const DECORATION_THRESHOLD: u32 = 13;
}
