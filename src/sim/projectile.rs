//! Fireballs
//!
//! A projectile is not an [`Actor`]: it flies straight, stops at the first
//! thing it hits, plays its dissipate frames and then asks to be removed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Direction};
use super::animation::{FrameClock, ProjectileFrames, ProjectileSprite};
use super::collision::check_object_collision;
use super::geometry::Aabb;
use super::world::TileMap;
use crate::consts::PROJECTILE_FRAME_TICKS;

/// Where and how a new projectile starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    /// Top-left corner
    pub pos: Vec2,
    pub direction: Direction,
    pub speed: f32,
}

/// What stopped a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// Hit and damaged the enemy with this id
    Enemy(u32),
    Tile,
    /// Left the viewport horizontally
    OutOfBounds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub bounds: Aabb,
    pub direction: Direction,
    pub speed: f32,
    pub damage: i32,
    pub hit_object: bool,
    /// Dissipate sequence finished; remove at end of tick
    pub dissipated: bool,
    pub frame: usize,
    pub sprite: ProjectileSprite,
    clock: FrameClock,
    frames: ProjectileFrames,
}

impl Projectile {
    pub fn new(id: u32, launch: Launch, size: f32, damage: i32, frames: ProjectileFrames) -> Self {
        Self {
            id,
            bounds: Aabb::new(launch.pos.x, launch.pos.y, size, size),
            direction: launch.direction,
            speed: launch.speed,
            damage,
            hit_object: false,
            dissipated: false,
            frame: 0,
            sprite: ProjectileSprite::Active { frame: 0 },
            clock: FrameClock::new(PROJECTILE_FRAME_TICKS),
            frames,
        }
    }

    /// Move, check for impact and animate. Returns the impact on the tick it
    /// happens.
    pub fn update(&mut self, map: &TileMap, enemies: &mut [Actor]) -> Option<Impact> {
        let mut impact = None;
        if !self.hit_object {
            self.bounds.pos.x += self.direction.sign() * self.speed;
            impact = self.check_impact(map, enemies);
            if let Some(what) = impact {
                log::debug!("projectile {} hit {:?}", self.id, what);
                self.hit_object = true;
                self.frame = 0;
                self.clock.reset();
            }
        }
        self.animate();
        impact
    }

    fn check_impact(&self, map: &TileMap, enemies: &mut [Actor]) -> Option<Impact> {
        if let Some(enemy) = enemies
            .iter_mut()
            .find(|e| e.alive && check_object_collision(&self.bounds, &e.bounds))
        {
            enemy.apply_damage(self.damage);
            return Some(Impact::Enemy(enemy.id));
        }
        if map
            .solid_tiles()
            .any(|t| check_object_collision(&self.bounds, &t.bounds))
        {
            return Some(Impact::Tile);
        }
        if self.bounds.right() < 0.0 || self.bounds.left() > map.width() {
            return Some(Impact::OutOfBounds);
        }
        None
    }

    fn animate(&mut self) {
        if self.dissipated || !self.clock.tick() {
            return;
        }
        if self.hit_object {
            self.sprite = ProjectileSprite::Dissipating { frame: self.frame };
            self.frame += 1;
            if self.frame >= self.frames.dissipate {
                self.dissipated = true;
            }
        } else {
            if self.frame >= self.frames.active {
                self.frame = 0;
            }
            self.sprite = ProjectileSprite::Active { frame: self.frame };
            self.frame += 1;
        }
    }
}
