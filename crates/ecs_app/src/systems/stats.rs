use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use ecs_system::{DisposeSystem, InitSystem, RenderSystem, System};
use ecs_world::{Query, World};
use tracing::info;

use crate::components::{AsteroidTag, Transform, Velocity};
use crate::event::HostEvent;

/// Population figures as of the last render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub renders: u64,
    pub entities: usize,
    pub asteroids: usize,
    pub moving: usize,
    pub peak_asteroids: usize,
}

/// Read handle to the figures a [`StatsSystem`] collects.
#[derive(Debug, Clone, Default)]
pub struct StatsReport(Rc<Cell<StatsSnapshot>>);

impl StatsReport {
    #[must_use]
    pub fn get(&self) -> StatsSnapshot {
        self.0.get()
    }
}

/// Stands in for drawing: tracks population counts every render and logs
/// them every `interval` renders and once at shutdown.
pub struct StatsSystem {
    interval: u64,
    report: StatsReport,
    queries: Option<(Query, Query)>,
}

impl StatsSystem {
    pub const NAME: &'static str = "stats";

    #[must_use]
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            report: StatsReport::default(),
            queries: None,
        }
    }

    #[must_use]
    pub fn report(&self) -> StatsReport {
        self.report.clone()
    }
}

impl InitSystem for StatsSystem {
    fn init(&mut self, world: &mut World) -> Result<()> {
        let asteroids = world.build_filter().include::<AsteroidTag>().build();
        let moving = world
            .build_filter()
            .include::<Transform>()
            .include::<Velocity>()
            .build();
        self.queries = Some((asteroids, moving));
        Ok(())
    }
}

impl RenderSystem for StatsSystem {
    fn render(&mut self, world: &mut World) -> Result<()> {
        let (asteroids, moving) = super::ready(&self.queries, Self::NAME)?;
        let previous = self.report.get();
        let current = StatsSnapshot {
            renders: previous.renders + 1,
            entities: world.entity_count(),
            asteroids: asteroids.len(),
            moving: moving.len(),
            peak_asteroids: previous.peak_asteroids.max(asteroids.len()),
        };
        self.report.0.set(current);

        if current.renders % self.interval == 0 {
            info!(
                render = current.renders,
                entities = current.entities,
                asteroids = current.asteroids,
                moving = current.moving,
                "population"
            );
        }
        Ok(())
    }
}

impl DisposeSystem for StatsSystem {
    fn dispose(&mut self, _world: &mut World) -> Result<()> {
        let last = self.report.get();
        info!(
            renders = last.renders,
            asteroids = last.asteroids,
            peak_asteroids = last.peak_asteroids,
            "final population"
        );
        Ok(())
    }
}

impl System<HostEvent> for StatsSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn as_init(&mut self) -> Option<&mut dyn InitSystem> {
        Some(self)
    }

    fn as_render(&mut self) -> Option<&mut dyn RenderSystem> {
        Some(self)
    }

    fn as_dispose(&mut self) -> Option<&mut dyn DisposeSystem> {
        Some(self)
    }
}
