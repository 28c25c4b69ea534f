//! Game state and level lifecycle
//!
//! Everything one tick reads or writes lives here. Entities are never removed
//! while a collection is being walked: removals are queued during the tick and
//! applied once at the end of it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorKind, BlockedPolicy, Direction, Motion};
use super::geometry::Aabb;
use super::player::PlayerController;
use super::projectile::{Launch, Projectile};
use super::world::{LevelError, LevelLayout, TileMap};
use crate::consts::FOOTING;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Player reached the exit; ticks do nothing until a restart
    Won,
    /// Player death animation finished; waiting for a restart
    Lost,
}

/// Things that happened during a tick, for sound and HUD collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelComplete,
    /// The player's death animation finished; the level should be reset
    PlayerDied,
    PlayerHurt { health: i32 },
    EnemyHurt { id: u32 },
    EnemyDefeated { id: u32 },
    ProjectileSpawned { id: u32 },
    ProjectileDissipated { id: u32 },
}

/// An entity queued for removal at the end of the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub kind: ActorKind,
    pub id: u32,
}

/// The full simulation state of one level
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    /// Ticks simulated since the game started (not reset by restarts)
    pub time_ticks: u64,
    /// Number of level resets so far
    pub restarts: u32,
    pub map: TileMap,
    pub player: PlayerController,
    pub enemies: Vec<Actor>,
    pub projectiles: Vec<Projectile>,
    pending_removals: Vec<Removal>,
    settings: Settings,
    /// Map as loaded, before any scrolling
    template: TileMap,
    player_start: Vec2,
    enemy_starts: Vec<Vec2>,
    next_id: u32,
}

impl GameState {
    /// Build a level from a parsed map
    pub fn new(layout: &LevelLayout, settings: Settings) -> Result<Self, LevelError> {
        let (template, spawns) = TileMap::from_layout(layout, &settings);
        let player_start = spawns.player.ok_or(LevelError::MissingPlayer)?;

        let mut state = Self {
            phase: GamePhase::Playing,
            time_ticks: 0,
            restarts: 0,
            map: template.clone(),
            player: PlayerController::new(1, player_start, &settings),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pending_removals: Vec::new(),
            settings,
            template,
            player_start,
            enemy_starts: spawns.enemies,
            next_id: 2,
        };
        state.spawn_enemies();

        log::info!(
            "Level loaded: {}x{} tiles, {} enemies",
            layout.cols,
            layout.rows,
            state.enemies.len()
        );
        Ok(state)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_enemies(&mut self) {
        let starts = self.enemy_starts.clone();
        self.enemies.clear();
        for floor in starts {
            let id = self.next_entity_id();
            let snail = spawn_snail(id, floor, &self.settings);
            self.enemies.push(snail);
        }
    }

    /// Put a new projectile in flight and return its id
    pub fn spawn_projectile(&mut self, launch: Launch) -> u32 {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile::new(
            id,
            launch,
            self.settings.projectile_size,
            self.settings.player.fire_damage,
            self.settings.projectile_frames,
        ));
        id
    }

    /// Reset the level from the loaded map: fresh player, enemies back at
    /// their starts, no projectiles, no scroll
    pub fn restart(&mut self) {
        self.map = self.template.clone();
        let id = self.next_entity_id();
        self.player = PlayerController::new(id, self.player_start, &self.settings);
        self.spawn_enemies();
        self.projectiles.clear();
        self.pending_removals.clear();
        self.phase = GamePhase::Playing;
        self.restarts += 1;
        log::info!("Level reset ({} so far)", self.restarts);
    }

    /// Queue an entity for removal at the end of the tick
    pub fn schedule_removal(&mut self, kind: ActorKind, id: u32) {
        let removal = Removal { kind, id };
        if !self.pending_removals.contains(&removal) {
            self.pending_removals.push(removal);
        }
    }

    pub fn pending_removals(&self) -> &[Removal] {
        &self.pending_removals
    }

    /// Drop every queued entity. Returns what was removed.
    pub fn apply_removals(&mut self) -> Vec<Removal> {
        let removals = std::mem::take(&mut self.pending_removals);
        for removal in &removals {
            match removal.kind {
                ActorKind::Enemy => self.enemies.retain(|e| e.id != removal.id),
                ActorKind::Projectile => self.projectiles.retain(|p| p.id != removal.id),
                // The player is never detached; its death resets the level
                ActorKind::Player => {}
            }
        }
        removals
    }
}

/// A patrolling snail standing on `floor`
fn spawn_snail(id: u32, floor: Vec2, settings: &Settings) -> Actor {
    let stats = &settings.enemy;
    let mut snail = Actor::new(
        id,
        ActorKind::Enemy,
        Aabb::new(floor.x, floor.y - stats.size + FOOTING, stats.size, stats.size),
        Motion {
            move_speed: stats.move_speed,
            jump_speed: stats.jump_speed,
            jump_height: stats.jump_height,
        },
        stats.health,
        settings.enemy_frames,
        settings.death_frames,
    );
    snail.direction = Direction::Right;
    snail.blocked = BlockedPolicy::Reverse;
    snail.intents.moving = true;
    snail.contact_damage = stats.contact_damage;
    snail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::DEMO_LEVEL;

    fn demo() -> GameState {
        let layout = LevelLayout::parse(DEMO_LEVEL).unwrap();
        GameState::new(&layout, Settings::default()).unwrap()
    }

    #[test]
    fn test_new_places_actors_on_their_cells() {
        let state = demo();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.player.actor.bounds.bottom(), state.player_start.y + FOOTING);
        for enemy in &state.enemies {
            assert!(enemy.intents.moving);
            assert_eq!(enemy.blocked, BlockedPolicy::Reverse);
            assert_eq!(enemy.contact_damage, 50);
        }
    }

    #[test]
    fn test_missing_player_is_an_error() {
        let layout = LevelLayout::parse("2\n3\n0 26 0\n14 14 14\n").unwrap();
        assert!(matches!(
            GameState::new(&layout, Settings::default()),
            Err(LevelError::MissingPlayer)
        ));
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = demo();
        let mut ids: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        ids.push(state.player.actor.id);
        ids.push(state.next_entity_id());
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_removals_are_deferred() {
        let mut state = demo();
        let enemy = state.enemies[0].id;
        let projectile = state.spawn_projectile(Launch {
            pos: Vec2::new(10.0, 10.0),
            direction: Direction::Right,
            speed: 4.0,
        });

        state.schedule_removal(ActorKind::Enemy, enemy);
        state.schedule_removal(ActorKind::Enemy, enemy);
        state.schedule_removal(ActorKind::Projectile, projectile);
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.pending_removals().len(), 2);

        let removed = state.apply_removals();
        assert_eq!(removed.len(), 2);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.projectiles.is_empty());
        assert!(state.pending_removals().is_empty());
    }

    #[test]
    fn test_restart_restores_level() {
        let mut state = demo();
        state.map.shift(Direction::Right, 40.0);
        state.enemies.clear();
        state.player.actor.health = 0;
        state.phase = GamePhase::Lost;

        state.restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.map.map_x, 0.0);
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.player.health(), 500);
        assert_eq!(state.restarts, 1);
    }
}
