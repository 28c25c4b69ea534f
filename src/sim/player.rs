//! The player character
//!
//! Wraps the shared [`Actor`] with what only the player does: scrolling the
//! map instead of walking while near the middle of the screen, the scratch and
//! fire attacks with their fire-energy resource, taking contact damage from
//! enemies, and reaching the exit.

use glam::Vec2;

use super::actor::{Action, Actor, ActorKind, ActorStatus, BlockedPolicy, Direction, FrameEvent, Motion};
use super::collision::check_object_collision;
use super::geometry::Aabb;
use super::projectile::Launch;
use super::tick::InputEvent;
use super::world::TileMap;
use crate::consts::{CENTER_BAND_FRACTION, FOOTING};
use crate::settings::{PlayerStats, Settings};

/// An in-progress scratch
#[derive(Debug, Clone, PartialEq)]
struct Swing {
    /// Facing when the swing started; decides how the hitbox is restored
    facing: Direction,
    /// Enemies already hit by this swing
    hits: Vec<u32>,
}

/// Outcome of one player tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerUpdate {
    pub status: ActorStatus,
    /// How far the map scrolled; enemies must be moved by the same amount
    pub scroll: Vec2,
}

/// Player character state and behaviour
#[derive(Debug, Clone)]
pub struct PlayerController {
    pub actor: Actor,
    stats: PlayerStats,
    fire_energy: u32,
    max_fire_energy: u32,
    regen_counter: u32,
    projectile_size: f32,
    base_width: f32,
    swing: Option<Swing>,
    in_center: bool,
    /// A fireball went off during this tick's input handling
    fired_this_tick: bool,
}

impl PlayerController {
    /// Create the player standing on `floor` (bottom-left of its start cell)
    pub fn new(id: u32, floor: Vec2, settings: &Settings) -> Self {
        let stats = settings.player.clone();
        let size = stats.size;
        let mut actor = Actor::new(
            id,
            ActorKind::Player,
            Aabb::new(floor.x, floor.y - size + FOOTING, size, size),
            Motion {
                move_speed: stats.move_speed,
                jump_speed: stats.jump_speed,
                jump_height: stats.jump_height,
            },
            stats.health,
            settings.player_frames,
            settings.death_frames,
        );
        actor.blocked = BlockedPolicy::Stop;

        Self {
            actor,
            fire_energy: stats.fire_energy,
            max_fire_energy: stats.fire_energy,
            regen_counter: 0,
            projectile_size: settings.projectile_size,
            base_width: size,
            swing: None,
            in_center: false,
            fired_this_tick: false,
            stats,
        }
    }

    // === HUD ===

    pub fn health(&self) -> i32 {
        self.actor.health.max(0)
    }

    pub fn max_health(&self) -> i32 {
        self.actor.max_health
    }

    pub fn fire_energy(&self) -> u32 {
        self.fire_energy
    }

    pub fn max_fire_energy(&self) -> u32 {
        self.max_fire_energy
    }

    pub fn is_scratching(&self) -> bool {
        self.swing.is_some()
    }

    // === Input ===

    /// Translate one input event into intents. Only attack triggers act
    /// immediately; a fire that goes off returns its launch parameters.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<Launch> {
        let intents = &mut self.actor.intents;
        match event {
            InputEvent::MoveLeft | InputEvent::MoveRight => {
                intents.moving = true;
                // Turning mid-swing would detach the widened hitbox from the sprite
                if !self.actor.attacking {
                    self.actor.direction = if event == InputEvent::MoveLeft {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                }
            }
            InputEvent::StopMoving => intents.moving = false,
            InputEvent::JumpPressed => intents.jumping = true,
            InputEvent::JumpReleased => intents.jumping = false,
            InputEvent::GlidePressed => intents.gliding = true,
            InputEvent::GlideReleased => intents.gliding = false,
            InputEvent::Scratch => {
                self.scratch();
            }
            InputEvent::Fire => return self.fire(),
        }
        None
    }

    fn can_attack(&self) -> bool {
        self.actor.alive && !self.actor.attacking && !self.actor.flinching
    }

    /// Start a scratch. The hitbox doubles in width towards the facing side
    /// until the swing animation ends.
    pub fn scratch(&mut self) -> bool {
        if !self.can_attack() {
            return false;
        }
        let facing = self.actor.direction;
        self.actor.begin_attack(Action::Scratching);
        self.actor.bounds.size.x = self.base_width * 2.0;
        if facing == Direction::Left {
            self.actor.bounds.pos.x -= self.base_width;
        }
        self.swing = Some(Swing {
            facing,
            hits: Vec::new(),
        });
        true
    }

    fn end_scratch(&mut self) {
        if let Some(swing) = self.swing.take() {
            if swing.facing == Direction::Left {
                self.actor.bounds.pos.x += self.base_width;
            }
            self.actor.bounds.size.x = self.base_width;
        }
    }

    /// Spend fire energy and launch a fireball from the facing side
    pub fn fire(&mut self) -> Option<Launch> {
        if !self.can_attack() || self.fire_energy < self.stats.fire_cost {
            return None;
        }
        self.fire_energy -= self.stats.fire_cost;
        self.regen_counter = 0;
        self.fired_this_tick = true;
        self.actor.begin_attack(Action::Firing);
        // Show the firing pose on the tick the fireball appears
        self.actor.clock.advance_next_tick();

        let b = &self.actor.bounds;
        let x = match self.actor.direction {
            Direction::Right => b.right(),
            Direction::Left => b.left() - self.projectile_size,
        };
        Some(Launch {
            pos: Vec2::new(x, b.top() + b.size.y / 4.0),
            direction: self.actor.direction,
            speed: self.stats.projectile_speed,
        })
    }

    /// Count one tick towards the next unit of fire energy
    pub fn regenerate_fire(&mut self) {
        if self.fire_energy >= self.max_fire_energy {
            self.regen_counter = 0;
            return;
        }
        self.regen_counter += 1;
        if self.regen_counter >= self.stats.fire_regen_delay {
            self.fire_energy += 1;
            self.regen_counter = 0;
        }
    }

    // === Movement ===

    /// Decide whether walking should scroll the map this tick: the player is
    /// inside the middle band of the viewport, nothing blocks the way, and
    /// there is map left to reveal.
    pub fn check_map_location(&mut self, map: &TileMap) -> bool {
        let dir = self.actor.direction;
        let band_width = map.width() * CENTER_BAND_FRACTION;
        let band_x = (map.width() - band_width) / 2.0;
        let x = self.actor.bounds.left();

        let in_band = x >= band_x && x <= band_x + band_width;
        let was_in_center = self.in_center;
        self.in_center =
            in_band && !self.actor.flags.blocked(dir) && map.scroll_room(dir) > 0.0;
        if self.in_center && !was_in_center {
            log::debug!("player {} reached the scroll band", self.actor.id);
        }
        self.in_center
    }

    /// Walk one step, or scroll the map by the same amount when centered.
    /// Returns the scroll applied to the map.
    pub fn walk(&mut self, map: &mut TileMap) -> Vec2 {
        let dir = self.actor.direction;
        if self.actor.flags.blocked(dir) {
            return Vec2::ZERO;
        }
        let speed = self.actor.motion.move_speed;
        self.actor.flags.release(dir.opposite());

        if self.check_map_location(map) {
            let amount = speed.min(map.scroll_room(dir));
            return map.shift(dir, amount);
        }

        let max_x = (map.width() - self.actor.bounds.size.x).max(0.0);
        let x = self.actor.bounds.pos.x + dir.sign() * speed;
        self.actor.bounds.pos.x = x.clamp(0.0, max_x);
        Vec2::ZERO
    }

    // === Combat ===

    /// Apply the current swing to overlapping enemies. Each enemy is hit at
    /// most once per swing. Returns the ids hit this tick.
    pub fn resolve_scratch(&mut self, enemies: &mut [Actor]) -> Vec<u32> {
        let Some(swing) = self.swing.as_mut() else {
            return Vec::new();
        };
        if !self.actor.alive || self.actor.action != Action::Scratching {
            return Vec::new();
        }

        let mut hit = Vec::new();
        for enemy in enemies.iter_mut() {
            if !enemy.alive || enemy.just_hurt || swing.hits.contains(&enemy.id) {
                continue;
            }
            if check_object_collision(&self.actor.bounds, &enemy.bounds) {
                enemy.apply_damage(self.stats.scratch_damage);
                swing.hits.push(enemy.id);
                hit.push(enemy.id);
            }
        }
        hit
    }

    /// Take contact damage from the first living enemy touching the player.
    /// Skipped while attacking or flinching.
    pub fn check_enemy_contact(&mut self, enemies: &[Actor]) -> bool {
        if !self.actor.alive || self.actor.attacking || self.actor.flinching {
            return false;
        }
        let touching = enemies
            .iter()
            .find(|e| e.alive && check_object_collision(&self.actor.bounds, &e.bounds));
        match touching {
            Some(enemy) => {
                self.actor.apply_damage(enemy.contact_damage);
                true
            }
            None => false,
        }
    }

    /// True if the player overlaps any exit tile
    pub fn touches_winning_tile(&self, map: &TileMap) -> bool {
        self.actor.alive
            && map
                .tiles
                .iter()
                .any(|t| map.is_winning(t) && check_object_collision(&self.actor.bounds, &t.bounds))
    }

    // === Tick ===

    pub fn update(&mut self, map: &mut TileMap) -> PlayerUpdate {
        if !self.actor.alive {
            let status = if self.actor.advance_death() {
                ActorStatus::DeathFinished
            } else {
                ActorStatus::Dying
            };
            return PlayerUpdate {
                status,
                scroll: Vec2::ZERO,
            };
        }

        self.actor.resolve_collisions(map);
        let scroll = if self.actor.is_moving() && !self.actor.attacking {
            self.walk(map)
        } else {
            Vec2::ZERO
        };
        self.actor.jump_or_fall();
        if self.actor.advance_animation() == FrameEvent::AttackFinished(Action::Scratching) {
            self.end_scratch();
        }
        // The regen delay starts counting on the tick after a fire
        if !std::mem::take(&mut self.fired_this_tick) {
            self.regenerate_fire();
        }

        let status = if self.actor.check_death(map.height()) {
            self.end_scratch();
            log::info!("Player died");
            ActorStatus::Died
        } else {
            ActorStatus::Alive
        };
        PlayerUpdate { status, scroll }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::UPDATE_TIME;
    use crate::sim::world::Tile;

    fn floor_map(width: f32, cols: usize) -> TileMap {
        let mut map = TileMap::new(width, 600.0, 13);
        map.map_width = cols as f32 * 50.0;
        for col in 0..cols {
            map.tiles.push(Tile {
                bounds: Aabb::new(col as f32 * 50.0, 550.0, 50.0, 50.0),
                id: 14,
            });
        }
        map
    }

    fn enemy_at(id: u32, x: f32, y: f32) -> Actor {
        let mut enemy = Actor::new(
            id,
            ActorKind::Enemy,
            Aabb::new(x, y, 50.0, 50.0),
            Motion {
                move_speed: 1.0,
                jump_speed: 3.0,
                jump_height: 40,
            },
            300,
            crate::sim::animation::ActionFrames::SNAIL,
            6,
        );
        enemy.contact_damage = 50;
        enemy
    }

    fn player_at(x: f32) -> PlayerController {
        PlayerController::new(0, Vec2::new(x, 550.0), &Settings::default())
    }

    #[test]
    fn test_input_only_sets_intents() {
        let mut player = player_at(100.0);
        let before = player.actor.bounds;
        player.handle_input(InputEvent::MoveLeft);
        player.handle_input(InputEvent::JumpPressed);
        assert!(player.actor.intents.moving);
        assert!(player.actor.intents.jumping);
        assert_eq!(player.actor.direction, Direction::Left);
        assert_eq!(player.actor.bounds, before);

        player.handle_input(InputEvent::StopMoving);
        player.handle_input(InputEvent::JumpReleased);
        assert!(!player.actor.intents.moving);
        assert!(!player.actor.intents.jumping);
    }

    #[test]
    fn test_scratch_widens_hitbox_towards_facing() {
        let mut player = player_at(200.0);
        player.actor.direction = Direction::Left;
        assert!(player.scratch());
        assert_eq!(player.actor.bounds.size.x, 160.0);
        assert_eq!(player.actor.bounds.left(), 120.0);
        assert!(!player.scratch());

        let mut map = floor_map(1000.0, 20);
        for _ in 0..(UPDATE_TIME * 6) {
            player.update(&mut map);
        }
        assert!(!player.is_scratching());
        assert_eq!(player.actor.bounds.size.x, 80.0);
        assert_eq!(player.actor.bounds.left(), 200.0);
        assert_eq!(player.actor.action, Action::Idle);
    }

    #[test]
    fn test_scratch_hits_once_per_swing() {
        let mut map = floor_map(1000.0, 20);
        let mut player = player_at(100.0);
        let mut enemies = vec![enemy_at(7, 200.0, 500.0)];
        player.scratch();

        let mut hits = 0;
        while player.is_scratching() {
            player.update(&mut map);
            for enemy in enemies.iter_mut() {
                enemy.advance_animation();
            }
            hits += player.resolve_scratch(&mut enemies).len();
        }
        assert_eq!(hits, 1);
        assert_eq!(enemies[0].health, 200);
    }

    #[test]
    fn test_fire_energy_example() {
        let mut settings = Settings::default();
        settings.player.fire_energy = 5;
        settings.player.fire_cost = 1;
        settings.player.fire_regen_delay = 10;
        let mut player = PlayerController::new(0, Vec2::new(100.0, 550.0), &settings);

        let launch = player.fire().unwrap();
        assert_eq!(launch.direction, Direction::Right);
        assert_eq!(launch.pos.x, player.actor.bounds.right());
        assert_eq!(player.fire_energy(), 4);

        for _ in 0..9 {
            player.regenerate_fire();
        }
        assert_eq!(player.fire_energy(), 4);
        player.regenerate_fire();
        assert_eq!(player.fire_energy(), 5);
    }

    #[test]
    fn test_fire_needs_enough_energy() {
        let mut settings = Settings::default();
        settings.player.fire_energy = 5;
        settings.player.fire_cost = 10;
        let mut player = PlayerController::new(0, Vec2::new(100.0, 550.0), &settings);
        assert!(player.fire().is_none());
        assert_eq!(player.fire_energy(), 5);
        assert!(!player.actor.attacking);
    }

    #[test]
    fn test_contact_damage_skipped_mid_attack_and_flinch() {
        let mut player = player_at(100.0);
        let enemies = vec![enemy_at(1, 150.0, 500.0)];

        player.scratch();
        assert!(!player.check_enemy_contact(&enemies));
        assert_eq!(player.health(), 500);

        let mut player = player_at(100.0);
        assert!(player.check_enemy_contact(&enemies));
        assert_eq!(player.health(), 450);
        assert!(player.actor.flinching);
        assert!(!player.check_enemy_contact(&enemies));
        assert_eq!(player.health(), 450);
    }

    #[test]
    fn test_centered_player_scrolls_map() {
        let mut map = floor_map(1000.0, 40);
        let mut player = player_at(460.0);
        player.handle_input(InputEvent::MoveRight);

        let update = player.update(&mut map);
        assert_eq!(update.scroll, Vec2::new(-2.0, 0.0));
        assert_eq!(player.actor.bounds.left(), 460.0);
        assert_eq!(map.map_x, -2.0);
    }

    #[test]
    fn test_player_walks_near_level_edge() {
        // Map no wider than the viewport: nothing to scroll
        let mut map = floor_map(1000.0, 20);
        let mut player = player_at(460.0);
        player.handle_input(InputEvent::MoveRight);
        let update = player.update(&mut map);
        assert_eq!(update.scroll, Vec2::ZERO);
        assert_eq!(player.actor.bounds.left(), 462.0);
    }

    #[test]
    fn test_player_cannot_leave_viewport() {
        let mut map = floor_map(1000.0, 20);
        let mut player = player_at(1.0);
        player.handle_input(InputEvent::MoveLeft);
        player.update(&mut map);
        assert_eq!(player.actor.bounds.left(), 0.0);
    }

    #[test]
    fn test_winning_tile_overlap() {
        let mut map = floor_map(1000.0, 20);
        map.winning_tiles = vec![15];
        map.tiles.push(Tile {
            bounds: Aabb::new(300.0, 500.0, 50.0, 50.0),
            id: 15,
        });
        assert!(!player_at(100.0).touches_winning_tile(&map));
        assert!(player_at(250.0).touches_winning_tile(&map));
    }
}
