//! Animation bookkeeping: frame tables, the per-actor tick clock and the
//! sprite reference each entity publishes for the renderer.

use serde::{Deserialize, Serialize};

use super::actor::Action;

/// Number of sprite frames for each action of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFrames {
    pub idle: usize,
    pub walking: usize,
    pub jumping: usize,
    pub falling: usize,
    pub gliding: usize,
    pub firing: usize,
    pub scratching: usize,
}

impl ActionFrames {
    /// Player sprite sheet layout (one row per action)
    pub const PLAYER: Self = Self {
        idle: 2,
        walking: 8,
        jumping: 1,
        falling: 2,
        gliding: 4,
        firing: 2,
        scratching: 5,
    };

    /// Snail enemies reuse their crawl cycle for every action
    pub const SNAIL: Self = Self::uniform(3);

    pub const fn uniform(frames: usize) -> Self {
        Self {
            idle: frames,
            walking: frames,
            jumping: frames,
            falling: frames,
            gliding: frames,
            firing: frames,
            scratching: frames,
        }
    }

    /// Frame count for an action
    pub fn count(&self, action: Action) -> usize {
        match action {
            Action::Idle => self.idle,
            Action::Walking => self.walking,
            Action::Jumping => self.jumping,
            Action::Falling => self.falling,
            Action::Gliding => self.gliding,
            Action::Firing => self.firing,
            Action::Scratching => self.scratching,
        }
    }

    /// True if every action has at least one frame
    pub fn is_valid(&self) -> bool {
        Action::ALL.iter().all(|&a| self.count(a) > 0)
    }
}

/// Frame counts for projectile sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileFrames {
    /// Looping in-flight sequence
    pub active: usize,
    /// One-shot sequence played after impact
    pub dissipate: usize,
}

impl Default for ProjectileFrames {
    fn default() -> Self {
        Self {
            active: 4,
            dissipate: 3,
        }
    }
}

/// Death animation frame count
pub const DEATH_FRAMES: usize = 6;

/// What an actor currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sprite {
    Action { action: Action, frame: usize },
    /// Hurt pose during the flinch blink
    Flinch,
    /// Empty tile during the flinch blink
    Blank,
    Death { frame: usize },
}

/// What a projectile currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileSprite {
    Active { frame: usize },
    Dissipating { frame: usize },
}

/// Counts ticks down to the next frame advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameClock {
    period: u32,
    remaining: u32,
}

impl FrameClock {
    pub fn new(period: u32) -> Self {
        let period = period.max(1);
        Self {
            period,
            remaining: period,
        }
    }

    /// Count one tick. Returns true when a frame advance is due.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.period;
            true
        } else {
            false
        }
    }

    /// Restart the countdown from a full period
    pub fn reset(&mut self) {
        self.remaining = self.period;
    }

    /// Make the very next tick advance a frame
    pub fn advance_next_tick(&mut self) {
        self.remaining = 1;
    }

    pub fn ticks_until_next_frame(&self) -> u32 {
        self.remaining
    }
}
