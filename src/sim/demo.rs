//! Demo autopilot
//!
//! Plays the game by producing the same [`InputEvent`]s a keyboard would: it
//! heads right, jumps over whatever stops it, now and then glides, turns back
//! for a while, scratches enemies in front of it and throws the odd fireball.
//! All choices come from a seeded PCG stream, so the same seed and level
//! always play out the same way.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actor::Direction;
use super::state::{GamePhase, GameState};
use super::tick::{InputEvent, TickInput};

/// How close (horizontally, in front) an enemy must be before the pilot swings
const SCRATCH_REACH: f32 = 60.0;

#[derive(Debug, Clone)]
pub struct DemoPilot {
    rng: Pcg32,
    heading: Direction,
    /// Ticks left before heading right again
    turn_ticks: u32,
    /// Ticks left to hold the jump key
    jump_ticks: u32,
    gliding: bool,
}

impl DemoPilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            heading: Direction::Right,
            turn_ticks: 0,
            jump_ticks: 0,
            gliding: false,
        }
    }

    /// Decide the input for the next tick
    pub fn next_input(&mut self, state: &GameState) -> TickInput {
        let mut events = Vec::new();
        let player = &state.player;
        let actor = &player.actor;
        if state.phase != GamePhase::Playing || !actor.alive {
            return TickInput::default();
        }

        // Heading
        if self.turn_ticks > 0 {
            self.turn_ticks -= 1;
            if self.turn_ticks == 0 {
                self.heading = Direction::Right;
            }
        } else if actor.intents.moving && self.rng.random_bool(0.002) {
            self.heading = Direction::Left;
            self.turn_ticks = self.rng.random_range(30..=120);
        }
        if !actor.intents.moving || actor.direction != self.heading {
            events.push(match self.heading {
                Direction::Left => InputEvent::MoveLeft,
                Direction::Right => InputEvent::MoveRight,
            });
        }

        // Jumping and gliding
        if self.jump_ticks > 0 {
            self.jump_ticks -= 1;
            if self.jump_ticks == 0 {
                events.push(InputEvent::JumpReleased);
                if self.rng.random_bool(0.3) {
                    events.push(InputEvent::GlidePressed);
                    self.gliding = true;
                }
            }
        } else if actor.flags.on_ground {
            if self.gliding {
                events.push(InputEvent::GlideReleased);
                self.gliding = false;
            }
            if actor.flags.blocked(actor.direction) || self.rng.random_bool(0.01) {
                events.push(InputEvent::JumpPressed);
                let longest = actor.motion.jump_height.max(10);
                self.jump_ticks = self.rng.random_range(10..=longest);
            }
        }

        // Attacks
        let facing = actor.direction.sign();
        let enemy_ahead = state.enemies.iter().any(|e| {
            let gap = (e.bounds.center().x - actor.bounds.center().x) * facing;
            e.alive
                && gap > 0.0
                && gap - (e.bounds.size.x + actor.bounds.size.x) / 2.0 < SCRATCH_REACH
                && e.bounds.bottom() > actor.bounds.top()
                && e.bounds.top() < actor.bounds.bottom()
        });
        if enemy_ahead && self.rng.random_bool(0.2) {
            events.push(InputEvent::Scratch);
        } else if player.fire_energy() >= state.settings().player.fire_cost
            && self.rng.random_bool(0.004)
        {
            events.push(InputEvent::Fire);
        }

        TickInput::from_events(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::tick::tick;
    use crate::sim::world::{DEMO_LEVEL, LevelLayout};

    fn demo() -> GameState {
        let layout = LevelLayout::parse(DEMO_LEVEL).unwrap();
        GameState::new(&layout, Settings::default()).unwrap()
    }

    fn play(seed: u64, ticks: usize) -> Vec<Vec<InputEvent>> {
        let mut state = demo();
        let mut pilot = DemoPilot::new(seed);
        let mut log = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            let input = pilot.next_input(&state);
            tick(&mut state, &input);
            log.push(input.events);
        }
        log
    }

    #[test]
    fn test_same_seed_same_inputs() {
        assert_eq!(play(42, 1500), play(42, 1500));
    }

    #[test]
    fn test_starts_walking_right() {
        let state = demo();
        let mut pilot = DemoPilot::new(7);
        let input = pilot.next_input(&state);
        assert_eq!(input.events.first(), Some(&InputEvent::MoveRight));
    }

    #[test]
    fn test_idle_outside_play() {
        let mut state = demo();
        state.phase = GamePhase::Won;
        let mut pilot = DemoPilot::new(7);
        assert!(pilot.next_input(&state).events.is_empty());
    }
}
