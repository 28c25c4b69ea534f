//! Dragon Platformer headless runner
//!
//! Loads a level and lets the demo autopilot play it, either stepping the
//! simulation as fast as possible or in real time on the tick scheduler.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use anyhow::Context;
use clap::Parser;

use dragon_platformer::sim::{
    DEMO_LEVEL, DemoPilot, GameEvent, GamePhase, GameState, LevelLayout, TickScheduler, tick,
};
use dragon_platformer::{Settings, init_logging};

/// Play a platformer level with the demo autopilot
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Level map file; the built-in demo level when omitted
    #[arg(long)]
    level: Option<PathBuf>,
    /// Settings JSON; defaults are used when the file does not exist
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
    /// Autopilot seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 6000)]
    ticks: u64,
    /// Run on the tick scheduler at the configured tick period
    #[arg(long)]
    realtime: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default)]
struct Summary {
    ticks: u64,
    deaths: u32,
    enemies_defeated: u32,
    fireballs: u32,
    won: bool,
}

impl Summary {
    fn record(&mut self, event: GameEvent) {
        match event {
            GameEvent::LevelComplete => self.won = true,
            GameEvent::PlayerDied => self.deaths += 1,
            GameEvent::EnemyDefeated { .. } => self.enemies_defeated += 1,
            GameEvent::ProjectileSpawned { .. } => self.fireballs += 1,
            _ => {}
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(summary) => {
            log::info!(
                "{} after {} ticks: {} deaths, {} enemies defeated, {} fireballs",
                if summary.won { "Won" } else { "Stopped" },
                summary.ticks,
                summary.deaths,
                summary.enemies_defeated,
                summary.fireballs
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<Summary> {
    let state = load_state(args)?;
    let pilot = DemoPilot::new(args.seed);
    log::info!("Autopilot seed: {}", args.seed);

    if args.realtime {
        run_realtime(state, pilot, args.ticks)
    } else {
        Ok(run_stepped(state, pilot, args.ticks))
    }
}

fn load_state(args: &Args) -> anyhow::Result<GameState> {
    let settings = Settings::load_or_default(&args.settings)?;
    let text = match &args.level {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read level {}", path.display()))?,
        None => DEMO_LEVEL.to_string(),
    };
    let layout = LevelLayout::parse(&text).context("invalid level map")?;
    Ok(GameState::new(&layout, settings)?)
}

/// Step the simulation back to back, no sleeping
fn run_stepped(mut state: GameState, mut pilot: DemoPilot, ticks: u64) -> Summary {
    let mut summary = Summary::default();
    for _ in 0..ticks {
        let input = pilot.next_input(&state);
        for event in tick(&mut state, &input) {
            summary.record(event);
            if event == GameEvent::PlayerDied {
                state.restart();
            }
        }
        if state.phase == GamePhase::Won {
            break;
        }
    }
    summary.ticks = state.time_ticks;
    summary
}

/// Drive the scheduler thread, feeding autopilot input from published snapshots
fn run_realtime(state: GameState, mut pilot: DemoPilot, ticks: u64) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();
    let mut scheduler = TickScheduler::for_state(&state);
    let period = scheduler.period();
    let (input, events) = scheduler.start(state)?;

    while let Some(snapshot) = scheduler.snapshot() {
        for event in events.try_iter() {
            summary.record(event);
        }
        if snapshot.time_ticks >= ticks || snapshot.phase == GamePhase::Won {
            break;
        }
        for event in pilot.next_input(&snapshot).events {
            input.send(event).context("tick thread hung up")?;
        }
        thread::sleep(period);
    }

    let state = scheduler.stop()?;
    for event in events.try_iter() {
        summary.record(event);
    }
    summary.ticks = state.time_ticks;
    Ok(summary)
}
