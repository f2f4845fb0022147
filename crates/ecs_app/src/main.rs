//! # ecs_app
//!
//! Headless host for the ECS: a fixed-rate tick loop driving a small
//! asteroid field simulation.
//!
//! ## Startup Sequence
//!
//! 1. Load the game config (`--config`, defaults otherwise).
//! 2. Build the system schedule and apply `--disable` flags.
//! 3. Run the init phases, tick until `--ticks` or a scripted quit, then
//!    run the dispose phases.

mod components;
mod config;
mod event;
mod systems;
mod tick;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use tick::{TickConfig, TickLoop};

#[derive(Parser)]
#[command(name = "ecs_app", about = "Headless asteroid field simulation on a phase-scheduled ECS")]
struct Args {
    /// JSON game config; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (0 = until a scripted quit)
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Target ticks per second
    #[arg(long, default_value_t = 60.0)]
    tick_rate: f64,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the named system disabled (repeatable)
    #[arg(short, long = "disable", value_name = "NAME")]
    disabled: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ecs_app=info".parse()?))
        .init();

    let args = Args::parse();

    let mut game = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            GameConfig::load(path)?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        game.seed = seed;
    }

    let (systems, report) = systems::build(&game);
    let mut tick_loop = TickLoop::new(
        TickConfig {
            tick_rate: args.tick_rate,
            max_ticks: args.ticks,
        },
        systems,
    );

    let status = tick_loop.status();
    for name in &args.disabled {
        if !status.set_enabled(name, false) {
            let known: Vec<String> = status.snapshot().into_iter().map(|(name, _)| name).collect();
            bail!("unknown system '{name}', expected one of: {}", known.join(", "));
        }
        info!(system = %name, "system disabled");
    }

    for scripted in &game.script {
        tick_loop.schedule_event(scripted.tick, scripted.event.clone());
    }

    info!(seed = game.seed, ticks = args.ticks, "simulation starting");
    tick_loop.start()?;
    tick_loop.run_to_completion()?;

    let stats = report.get();
    info!(
        ticks = tick_loop.tick_id(),
        quit = tick_loop.quit_requested(),
        renders = stats.renders,
        entities = tick_loop.world().entity_count(),
        peak_asteroids = stats.peak_asteroids,
        "simulation finished"
    );
    Ok(())
}
