//! Fixed timestep simulation tick
//!
//! One call to [`tick`] is one atomic step of the whole level: input events are
//! turned into intents, every live actor updates, the player's attacks and the
//! projectiles are resolved, and queued removals are applied last.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{ActorKind, ActorStatus};
use super::projectile::Impact;
use super::state::{GameEvent, GamePhase, GameState};

/// A key press or release, already mapped to a game command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    MoveLeft,
    MoveRight,
    StopMoving,
    JumpPressed,
    JumpReleased,
    GlidePressed,
    GlideReleased,
    Scratch,
    Fire,
}

impl InputEvent {
    /// Key state that only sets intents; attacks are not intents
    pub fn is_intent(self) -> bool {
        !matches!(self, InputEvent::Scratch | InputEvent::Fire)
    }
}

/// Input collected since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Applied in order at the start of the tick
    pub events: Vec<InputEvent>,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn from_events(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            pause: false,
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        match state.phase {
            GamePhase::Playing => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }
    if state.phase == GamePhase::Paused {
        // Keep intents in step with the keys so releases are not lost
        for &event in input.events.iter().filter(|e| e.is_intent()) {
            state.player.handle_input(event);
        }
        return events;
    }
    if state.phase != GamePhase::Playing {
        return events;
    }
    state.time_ticks += 1;

    // Intents first so the whole tick sees one consistent set
    for &event in &input.events {
        if let Some(launch) = state.player.handle_input(event) {
            let id = state.spawn_projectile(launch);
            events.push(GameEvent::ProjectileSpawned { id });
        }
    }

    update_actors(state, &mut events);
    resolve_player_contacts(state, &mut events);
    update_projectiles(state, &mut events);

    for removal in state.apply_removals() {
        if removal.kind == ActorKind::Projectile {
            events.push(GameEvent::ProjectileDissipated { id: removal.id });
        }
    }

    events
}

fn update_actors(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let update = state.player.update(&mut state.map);
    if update.scroll != Vec2::ZERO {
        for enemy in &mut state.enemies {
            enemy.bounds.translate(update.scroll);
        }
    }
    if update.status == ActorStatus::DeathFinished {
        log::info!("Player death animation finished");
        state.phase = GamePhase::Lost;
        events.push(GameEvent::PlayerDied);
    }

    let mut finished = Vec::new();
    for enemy in &mut state.enemies {
        match enemy.update(&state.map) {
            ActorStatus::Died => events.push(GameEvent::EnemyDefeated { id: enemy.id }),
            ActorStatus::DeathFinished => finished.push(enemy.id),
            ActorStatus::Alive | ActorStatus::Dying => {}
        }
    }
    for id in finished {
        state.schedule_removal(ActorKind::Enemy, id);
    }
}

fn resolve_player_contacts(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.player.actor.alive {
        return;
    }

    for id in state.player.resolve_scratch(&mut state.enemies) {
        events.push(GameEvent::EnemyHurt { id });
    }
    if state.player.check_enemy_contact(&state.enemies) {
        events.push(GameEvent::PlayerHurt {
            health: state.player.health(),
        });
    }
    if state.player.touches_winning_tile(&state.map) {
        log::info!("Level complete after {} ticks", state.time_ticks);
        state.phase = GamePhase::Won;
        events.push(GameEvent::LevelComplete);
    }
}

fn update_projectiles(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let mut dissipated = Vec::new();
    for projectile in &mut state.projectiles {
        if let Some(Impact::Enemy(id)) = projectile.update(&state.map, &mut state.enemies) {
            events.push(GameEvent::EnemyHurt { id });
        }
        if projectile.dissipated {
            dissipated.push(projectile.id);
        }
    }
    for id in dissipated {
        state.schedule_removal(ActorKind::Projectile, id);
    }
}
