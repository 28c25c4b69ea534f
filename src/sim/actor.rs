//! Actors and their action state machine
//!
//! An actor is the shared record behind the player and the enemies. Each tick
//! runs the same sequence: resolve tile contacts, walk, jump or fall, advance
//! the animation, check for death. Flinching and dying are overlays that take
//! over the animation while they last.
//!
//! The decisions are written as free functions over plain values
//! ([`vertical_step`], [`resolve_action`]) so they can be tested without a
//! world or a renderer.

use serde::{Deserialize, Serialize};

use super::animation::{ActionFrames, FrameClock, Sprite};
use super::collision::{self, CollisionFlags};
use super::geometry::Aabb;
use super::world::TileMap;
use crate::consts::{DEATH_TIME, FLINCH_STEPS, UPDATE_TIME};

/// Facing / travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// What kind of entity a record is; decides what happens after it dies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Death restarts the level
    Player,
    /// Death removes it from the level
    Enemy,
    /// Removed once it has dissipated
    Projectile,
}

/// What an actor does when it walks into a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockedPolicy {
    Stop,
    /// Patrol back the other way
    Reverse,
}

/// The action an actor is animating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Idle,
    Walking,
    Jumping,
    Falling,
    Gliding,
    Firing,
    Scratching,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Idle,
        Action::Walking,
        Action::Jumping,
        Action::Falling,
        Action::Gliding,
        Action::Firing,
        Action::Scratching,
    ];

    /// Attacks play their frames once and then hand back to Idle
    pub fn is_one_shot(self) -> bool {
        matches!(self, Action::Firing | Action::Scratching)
    }
}

/// Movement wishes set by input (or by enemy AI). Never touch geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intents {
    pub moving: bool,
    pub jumping: bool,
    pub gliding: bool,
}

/// Movement tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub move_speed: f32,
    pub jump_speed: f32,
    /// Maximum ticks a jump can keep rising
    pub jump_height: u32,
}

/// Vertical outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalStep {
    /// Still rising
    Rise,
    /// Standing on ground; jumping is possible again
    Land,
    /// Airborne, descending slowly
    Glide,
    /// Airborne, descending at full speed
    Fall,
}

/// Decide the vertical step. Rising needs the jump intent and remaining jump
/// time; everything else falls, glides or lands.
pub fn vertical_step(intents: &Intents, on_ground: bool, jump_time: u32, jump_height: u32) -> VerticalStep {
    if intents.jumping && jump_time < jump_height {
        VerticalStep::Rise
    } else if on_ground {
        VerticalStep::Land
    } else if intents.gliding {
        VerticalStep::Glide
    } else {
        VerticalStep::Fall
    }
}

/// Pick the action for this tick. An attack in progress keeps its action.
pub fn resolve_action(current: Action, moving: bool, attacking: bool, step: VerticalStep) -> Action {
    if attacking {
        return current;
    }
    match step {
        VerticalStep::Rise => Action::Jumping,
        VerticalStep::Glide => Action::Gliding,
        VerticalStep::Fall => Action::Falling,
        VerticalStep::Land if moving => Action::Walking,
        VerticalStep::Land => Action::Idle,
    }
}

/// Result of an animation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// No frame advance this tick
    None,
    Advanced,
    /// A one-shot attack finished and the actor went back to Idle
    AttackFinished(Action),
    /// The flinch blink completed
    FlinchEnded,
}

/// Where an actor is in its lifecycle after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorStatus {
    Alive,
    /// Died this tick
    Died,
    /// Death animation playing
    Dying,
    /// Death animation done; the owner should detach it
    DeathFinished,
}

/// A simulated character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: u32,
    pub kind: ActorKind,
    pub bounds: Aabb,
    pub motion: Motion,
    pub direction: Direction,
    pub blocked: BlockedPolicy,
    pub intents: Intents,
    /// A one-shot attack is playing
    pub attacking: bool,

    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub flinching: bool,
    /// Took damage and has not finished flinching yet
    pub just_hurt: bool,
    /// Damage this actor deals by touching the player
    pub contact_damage: i32,

    /// Ticks spent rising in the current jump, `0..=motion.jump_height`
    pub jump_time: u32,
    pub flags: CollisionFlags,

    pub action: Action,
    /// Next frame to show for the current action
    pub frame: usize,
    pub clock: FrameClock,
    pub flinch_step: u8,
    pub death_advances: u32,
    pub sprite: Sprite,

    frames: ActionFrames,
    death_frames: usize,
}

impl Actor {
    pub fn new(
        id: u32,
        kind: ActorKind,
        bounds: Aabb,
        motion: Motion,
        health: i32,
        frames: ActionFrames,
        death_frames: usize,
    ) -> Self {
        Self {
            id,
            kind,
            bounds,
            motion,
            direction: Direction::Right,
            blocked: BlockedPolicy::Stop,
            intents: Intents::default(),
            attacking: false,
            health,
            max_health: health,
            alive: true,
            flinching: false,
            just_hurt: false,
            contact_damage: 0,
            jump_time: 0,
            flags: CollisionFlags::default(),
            action: Action::Idle,
            frame: 0,
            clock: FrameClock::new(UPDATE_TIME),
            flinch_step: 0,
            death_advances: 0,
            sprite: Sprite::Action {
                action: Action::Idle,
                frame: 0,
            },
            frames,
            death_frames,
        }
    }

    /// Walking is suspended while flinching
    pub fn is_moving(&self) -> bool {
        self.intents.moving && !self.flinching
    }

    /// Recompute contact flags against the map
    pub fn resolve_collisions(&mut self, map: &TileMap) {
        let tiles = collision::gather_colliding_tiles(&self.bounds, map);
        let outcome = collision::update_collisions(&self.bounds, self.direction, &tiles);
        self.flags = outcome.flags;
        if outcome.ceiling_hit {
            self.jump_time = self.motion.jump_height;
        }
    }

    /// Take one step in the facing direction unless a wall is in the way.
    /// Returns true if the actor moved.
    pub fn walk(&mut self) -> bool {
        if self.flags.blocked(self.direction) {
            if self.blocked == BlockedPolicy::Reverse {
                self.direction = self.direction.opposite();
            }
            return false;
        }
        self.bounds.pos.x += self.direction.sign() * self.motion.move_speed;
        self.flags.release(self.direction.opposite());
        true
    }

    /// Rise, glide, fall or land for this tick and settle the action
    pub fn jump_or_fall(&mut self) -> VerticalStep {
        let step = vertical_step(
            &self.intents,
            self.flags.on_ground,
            self.jump_time,
            self.motion.jump_height,
        );
        match step {
            VerticalStep::Rise => {
                self.jump_time += 1;
                self.flags.leave_ground();
                self.bounds.pos.y -= self.motion.jump_speed;
            }
            VerticalStep::Land => self.jump_time = 0,
            VerticalStep::Glide => {
                self.jump_time = self.motion.jump_height;
                self.bounds.pos.y += self.motion.jump_speed / 3.0;
            }
            VerticalStep::Fall => {
                self.jump_time = self.motion.jump_height;
                self.bounds.pos.y += self.motion.jump_speed;
            }
        }
        self.action = resolve_action(self.action, self.is_moving(), self.attacking, step);
        step
    }

    /// Start a one-shot action from its first frame
    pub fn begin_attack(&mut self, action: Action) {
        self.attacking = true;
        self.action = action;
        self.frame = 0;
    }

    /// Count one tick of animation
    pub fn advance_animation(&mut self) -> FrameEvent {
        if !self.clock.tick() {
            return FrameEvent::None;
        }
        if self.flinching {
            return self.advance_flinch();
        }

        let mut event = FrameEvent::Advanced;
        if self.frame >= self.frames.count(self.action) {
            self.frame = 0;
            if self.attacking && self.action.is_one_shot() {
                event = FrameEvent::AttackFinished(self.action);
                self.attacking = false;
                self.action = Action::Idle;
            }
        }
        self.sprite = Sprite::Action {
            action: self.action,
            frame: self.frame,
        };
        self.frame += 1;
        event
    }

    fn advance_flinch(&mut self) -> FrameEvent {
        self.sprite = if self.flinch_step % 2 == 0 {
            Sprite::Flinch
        } else {
            Sprite::Blank
        };
        self.flinch_step += 1;
        if self.flinch_step < FLINCH_STEPS {
            return FrameEvent::Advanced;
        }
        self.flinch_step = 0;
        self.flinching = false;
        self.just_hurt = false;
        FrameEvent::FlinchEnded
    }

    /// Take damage and start flinching. A hit during a flinch does not
    /// restart the blink.
    pub fn apply_damage(&mut self, amount: i32) {
        if !self.alive {
            return;
        }
        self.health -= amount;
        self.just_hurt = true;
        if !self.flinching {
            self.flinching = true;
            self.flinch_step = 0;
        }
    }

    /// Flip to dead when out of health or below the bottom of the world.
    /// Returns true on the tick the actor dies.
    pub fn check_death(&mut self, world_height: f32) -> bool {
        if !self.alive {
            return false;
        }
        if self.bounds.bottom() >= world_height {
            self.health = 0;
        }
        if self.health > 0 {
            return false;
        }
        self.alive = false;
        self.attacking = false;
        self.flinching = false;
        self.frame = 0;
        self.clock.reset();
        self.death_advances = 0;
        true
    }

    /// Play the death animation. Returns true exactly once, when it ends.
    pub fn advance_death(&mut self) -> bool {
        if self.death_advances >= DEATH_TIME || !self.clock.tick() {
            return false;
        }
        if self.frame >= self.death_frames {
            self.frame = 0;
        }
        self.sprite = Sprite::Death { frame: self.frame };
        self.frame += 1;
        self.death_advances += 1;
        self.death_advances == DEATH_TIME
    }

    /// Generic per-tick update, used as is by patrolling enemies
    pub fn update(&mut self, map: &TileMap) -> ActorStatus {
        if !self.alive {
            return if self.advance_death() {
                ActorStatus::DeathFinished
            } else {
                ActorStatus::Dying
            };
        }

        self.resolve_collisions(map);
        if self.is_moving() && !self.attacking {
            self.walk();
        }
        self.jump_or_fall();
        self.advance_animation();

        if self.check_death(map.height()) {
            log::debug!("{:?} {} died", self.kind, self.id);
            ActorStatus::Died
        } else {
            ActorStatus::Alive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::Tile;
    use proptest::prelude::*;

    fn snail(x: f32, y: f32) -> Actor {
        let mut actor = Actor::new(
            1,
            ActorKind::Enemy,
            Aabb::new(x, y, 50.0, 50.0),
            Motion {
                move_speed: 1.0,
                jump_speed: 3.0,
                jump_height: 40,
            },
            100,
            ActionFrames::SNAIL,
            6,
        );
        actor.blocked = BlockedPolicy::Reverse;
        actor.intents.moving = true;
        actor
    }

    fn map_with(tiles: &[(f32, f32)]) -> TileMap {
        let mut map = TileMap::new(1000.0, 600.0, 13);
        for &(x, y) in tiles {
            map.tiles.push(Tile {
                bounds: Aabb::new(x, y, 50.0, 50.0),
                id: 14,
            });
        }
        map
    }

    #[test]
    fn test_vertical_step_table() {
        let jumping = Intents {
            jumping: true,
            ..Default::default()
        };
        let gliding = Intents {
            gliding: true,
            ..Default::default()
        };
        assert_eq!(vertical_step(&jumping, true, 0, 40), VerticalStep::Rise);
        assert_eq!(vertical_step(&jumping, false, 40, 40), VerticalStep::Fall);
        assert_eq!(vertical_step(&jumping, true, 40, 40), VerticalStep::Land);
        assert_eq!(vertical_step(&gliding, false, 40, 40), VerticalStep::Glide);
        assert_eq!(vertical_step(&Intents::default(), true, 0, 40), VerticalStep::Land);
    }

    #[test]
    fn test_resolve_action() {
        assert_eq!(
            resolve_action(Action::Idle, true, false, VerticalStep::Land),
            Action::Walking
        );
        assert_eq!(
            resolve_action(Action::Walking, false, false, VerticalStep::Land),
            Action::Idle
        );
        assert_eq!(
            resolve_action(Action::Walking, true, false, VerticalStep::Fall),
            Action::Falling
        );
        assert_eq!(
            resolve_action(Action::Scratching, true, true, VerticalStep::Rise),
            Action::Scratching
        );
    }

    #[test]
    fn test_continuous_jump_rises_jump_speed_times_height() {
        let map = map_with(&[]);
        let mut actor = snail(100.0, 300.0);
        actor.intents = Intents {
            jumping: true,
            ..Default::default()
        };

        for _ in 0..40 {
            actor.resolve_collisions(&map);
            assert_eq!(actor.jump_or_fall(), VerticalStep::Rise);
        }
        assert_eq!(actor.bounds.top(), 300.0 - 120.0);
        assert_eq!(actor.action, Action::Jumping);

        actor.resolve_collisions(&map);
        assert_eq!(actor.jump_or_fall(), VerticalStep::Fall);
        assert_eq!(actor.action, Action::Falling);
        assert_eq!(actor.jump_time, 40);
    }

    #[test]
    fn test_glide_descends_at_a_third() {
        let map = map_with(&[]);
        let mut actor = snail(100.0, 100.0);
        actor.intents = Intents {
            gliding: true,
            ..Default::default()
        };
        actor.resolve_collisions(&map);
        actor.jump_or_fall();
        assert_eq!(actor.bounds.top(), 101.0);
        assert_eq!(actor.action, Action::Gliding);
    }

    #[test]
    fn test_ceiling_cancels_jump() {
        let map = map_with(&[(100.0, 150.0)]);
        let mut actor = snail(100.0, 200.0);
        actor.intents.jumping = true;
        actor.jump_time = 3;
        actor.resolve_collisions(&map);
        assert_eq!(actor.jump_time, actor.motion.jump_height);
        assert!(!actor.flags.hit_left && !actor.flags.hit_right);
        assert_eq!(actor.jump_or_fall(), VerticalStep::Fall);
    }

    #[test]
    fn test_patrol_reverses_at_wall() {
        // Floor with a wall block at x=150
        let map = map_with(&[(0.0, 300.0), (50.0, 300.0), (100.0, 300.0), (150.0, 300.0), (150.0, 250.0)]);
        let mut actor = snail(90.0, 250.0);
        let mut reversed = false;
        for _ in 0..30 {
            actor.update(&map);
            if actor.direction == Direction::Left {
                reversed = true;
                break;
            }
        }
        assert!(reversed);
        assert!(actor.bounds.right() <= 150.0);
        assert!(actor.alive);
    }

    #[test]
    fn test_walking_off_a_ledge_falls() {
        let map = map_with(&[(0.0, 300.0), (50.0, 300.0), (100.0, 300.0)]);
        // Feet slightly into the floor so the middle sample bridges tile seams
        let mut actor = snail(50.0, 251.0);
        let mut fell = false;
        for _ in 0..200 {
            actor.update(&map);
            if actor.action == Action::Falling {
                fell = true;
                break;
            }
            assert!(actor.flags.on_ground);
        }
        assert!(fell);
        assert!(!actor.flags.on_ground);
        assert!(actor.bounds.left() > 100.0);

        let before = actor.bounds.top();
        actor.update(&map);
        assert!(actor.bounds.top() > before);
    }

    #[test]
    fn test_flinch_lasts_four_advances() {
        let mut actor = snail(0.0, 0.0);
        actor.begin_attack(Action::Firing);
        actor.apply_damage(10);
        assert!(actor.flinching && actor.just_hurt);
        assert!(!actor.is_moving());

        let mut advances = 0;
        let mut sprites = Vec::new();
        while actor.flinching {
            match actor.advance_animation() {
                FrameEvent::None => {}
                _ => {
                    advances += 1;
                    sprites.push(actor.sprite);
                }
            }
        }
        assert_eq!(advances, 4);
        assert_eq!(
            sprites,
            vec![Sprite::Flinch, Sprite::Blank, Sprite::Flinch, Sprite::Blank]
        );
        assert!(!actor.just_hurt);
        assert!(actor.is_moving());
        assert_eq!(actor.health, 90);
    }

    #[test]
    fn test_one_shot_attack_returns_to_idle() {
        let mut actor = snail(0.0, 0.0);
        actor.begin_attack(Action::Scratching);
        let mut finished = None;
        for _ in 0..(UPDATE_TIME * 4) {
            if let FrameEvent::AttackFinished(a) = actor.advance_animation() {
                finished = Some(a);
            }
        }
        // Three snail frames, then the wrap on the fourth advance
        assert_eq!(finished, Some(Action::Scratching));
        assert!(!actor.attacking);
        assert_eq!(actor.action, Action::Idle);
    }

    #[test]
    fn test_death_sequence() {
        let mut actor = snail(0.0, 0.0);
        actor.apply_damage(100);
        assert!(actor.check_death(600.0));
        assert!(!actor.alive);
        assert!(!actor.check_death(600.0));

        let mut finished_at = None;
        for t in 1..=(UPDATE_TIME * DEATH_TIME + 50) {
            if actor.advance_death() {
                assert!(finished_at.is_none());
                finished_at = Some(t);
            }
        }
        assert_eq!(finished_at, Some(UPDATE_TIME * DEATH_TIME));
    }

    #[test]
    fn test_falling_off_the_world_kills() {
        let mut actor = snail(0.0, 560.0);
        assert!(actor.check_death(600.0));
        assert_eq!(actor.health, 0);
    }

    proptest! {
        #[test]
        fn prop_jump_time_stays_in_range(
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..300),
            jump_height in 1u32..60,
        ) {
            let map = map_with(&[(0.0, 400.0), (50.0, 400.0), (100.0, 400.0), (50.0, 200.0)]);
            let mut actor = snail(50.0, 350.0);
            actor.motion.jump_height = jump_height;
            for (moving, jumping, gliding) in inputs {
                actor.intents = Intents { moving, jumping, gliding };
                actor.update(&map);
                prop_assert!(actor.jump_time <= actor.motion.jump_height);
            }
        }
    }
}
