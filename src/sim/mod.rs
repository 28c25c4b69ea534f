//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (demo autopilot)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! The one exception is [`scheduler`], which drives [`tick`] from a thread.

pub mod actor;
pub mod animation;
pub mod collision;
pub mod demo;
pub mod geometry;
pub mod player;
pub mod projectile;
pub mod scheduler;
pub mod state;
pub mod tick;
pub mod world;

pub use actor::{Action, Actor, ActorKind, ActorStatus, BlockedPolicy, Direction, Intents};
pub use animation::{ActionFrames, ProjectileFrames, ProjectileSprite, Sprite};
pub use collision::{CollisionFlags, check_object_collision, gather_colliding_tiles, update_collisions};
pub use demo::DemoPilot;
pub use geometry::{Aabb, Point, distance};
pub use player::PlayerController;
pub use projectile::{Impact, Launch, Projectile};
pub use scheduler::{SchedulerError, TickScheduler};
pub use state::{GameEvent, GamePhase, GameState, Removal};
pub use tick::{InputEvent, TickInput, tick};
pub use world::{DEMO_LEVEL, LevelError, LevelLayout, Tile, TileMap};
