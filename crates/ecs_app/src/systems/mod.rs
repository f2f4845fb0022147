//! Systems of the asteroid field simulation.

mod cleanup;
mod control;
mod motion;
mod spawn;
mod stats;
mod timers;

use anyhow::{Context, Result};
use ecs_system::{Systems, SystemsBuilder};

use crate::config::GameConfig;
use crate::event::HostEvent;

pub use cleanup::CleanupSystem;
pub use control::ControlSystem;
pub use motion::{MoveSystem, RotateSystem};
pub use spawn::SpawnAsteroidSystem;
pub use stats::{StatsReport, StatsSystem};
pub use timers::{CooldownTickSystem, LifespanTickSystem};

/// The full schedule in run order, plus the stats handle.
pub fn build(config: &GameConfig) -> (Systems<HostEvent>, StatsReport) {
    let builder = SystemsBuilder::new();
    let status = builder.status();
    let stats = StatsSystem::new(config.stats_interval);
    let report = stats.report();
    let systems = builder
        .add(ControlSystem::new(status))
        .add(SpawnAsteroidSystem::new(config))
        .add(MoveSystem::default())
        .add(RotateSystem::default())
        .add(CooldownTickSystem::default())
        .add(LifespanTickSystem::default())
        .add(stats)
        .add(CleanupSystem)
        .build();
    (systems, report)
}

/// Borrow a system's init-time state, failing if init has not run.
fn ready<'a, T>(state: &'a Option<T>, system: &str) -> Result<&'a T> {
    state
        .as_ref()
        .with_context(|| format!("{system} used before init"))
}
