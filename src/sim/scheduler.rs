//! Fixed-period tick scheduler
//!
//! Runs [`tick`] on a background thread at a fixed period. Each tick runs while
//! holding the run gate, so [`TickScheduler::pause`] returns only once the
//! current tick is complete and no partial state is ever published. Input
//! arrives over a channel and is drained at the start of every tick; events go
//! back the same way.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use thiserror::Error;

use super::state::{GameEvent, GameState};
use super::tick::{InputEvent, TickInput, tick};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,
    #[error("scheduler is not running")]
    NotRunning,
    #[error("tick thread panicked")]
    ThreadPanicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Paused,
    Stopping,
}

struct Shared {
    gate: Mutex<RunState>,
    wake: Condvar,
    snapshot: RwLock<Option<GameState>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the tick thread
pub struct TickScheduler {
    period: Duration,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<GameState>>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            shared: Arc::new(Shared {
                gate: Mutex::new(RunState::Stopping),
                wake: Condvar::new(),
                snapshot: RwLock::new(None),
            }),
            worker: None,
        }
    }

    /// Scheduler ticking at the period from the state's settings
    pub fn for_state(state: &GameState) -> Self {
        Self::new(Duration::from_millis(state.settings().tick_millis.max(1)))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn is_paused(&self) -> bool {
        *lock(&self.shared.gate) == RunState::Paused
    }

    /// Spawn the tick thread. Returns the input sender and the event receiver.
    pub fn start(
        &mut self,
        state: GameState,
    ) -> Result<(Sender<InputEvent>, Receiver<GameEvent>), SchedulerError> {
        if self.worker.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let (tx_input, rx_input) = unbounded::<InputEvent>();
        let (tx_event, rx_event) = unbounded::<GameEvent>();

        *self
            .shared
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        *lock(&self.shared.gate) = RunState::Running;

        let shared = Arc::clone(&self.shared);
        let period = self.period;
        self.worker = Some(thread::spawn(move || {
            run_loop(&shared, state, period, &rx_input, &tx_event)
        }));
        log::info!("Tick scheduler started ({:?} per tick)", self.period);
        Ok((tx_input, rx_event))
    }

    /// Stop ticking after the tick in progress, if any
    pub fn pause(&self) -> Result<(), SchedulerError> {
        if self.worker.is_none() {
            return Err(SchedulerError::NotRunning);
        }
        let mut run = lock(&self.shared.gate);
        if *run == RunState::Running {
            *run = RunState::Paused;
            log::debug!("Tick scheduler paused");
        }
        Ok(())
    }

    pub fn resume(&self) -> Result<(), SchedulerError> {
        if self.worker.is_none() {
            return Err(SchedulerError::NotRunning);
        }
        let mut run = lock(&self.shared.gate);
        if *run == RunState::Paused {
            *run = RunState::Running;
            self.shared.wake.notify_all();
            log::debug!("Tick scheduler resumed");
        }
        Ok(())
    }

    /// Stop the thread and hand back the final state
    pub fn stop(&mut self) -> Result<GameState, SchedulerError> {
        let worker = self.worker.take().ok_or(SchedulerError::NotRunning)?;
        *lock(&self.shared.gate) = RunState::Stopping;
        self.shared.wake.notify_all();
        let state = worker.join().map_err(|_| SchedulerError::ThreadPanicked)?;
        log::info!("Tick scheduler stopped after {} ticks", state.time_ticks);
        Ok(state)
    }

    /// The state as of the last completed tick
    pub fn snapshot(&self) -> Option<GameState> {
        self.shared
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

fn run_loop(
    shared: &Shared,
    mut state: GameState,
    period: Duration,
    inputs: &Receiver<InputEvent>,
    events: &Sender<GameEvent>,
) -> GameState {
    let mut deadline = Instant::now();
    loop {
        {
            let mut run = lock(&shared.gate);
            while *run == RunState::Paused {
                run = shared.wake.wait(run).unwrap_or_else(PoisonError::into_inner);
            }
            if *run == RunState::Stopping {
                break;
            }

            let input = TickInput::from_events(inputs.try_iter());
            let produced = tick(&mut state, &input);
            let player_died = produced.contains(&GameEvent::PlayerDied);
            for event in produced {
                // Nobody listening is fine
                let _ = events.send(event);
            }
            if player_died {
                state.restart();
            }

            *shared
                .snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        }

        deadline += period;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        } else {
            // Fell behind (or was paused); don't try to catch up
            deadline = now;
        }
    }
    state
}
