//! Registration and phase dispatch.

use anyhow::{Context, Result};
use ecs_world::World;
use tracing::{debug, info, trace};

use crate::phase::Phase;
use crate::status::SystemStatus;
use crate::system::System;

type PhaseLists = [Vec<usize>; Phase::ALL.len()];

/// Collects systems in registration order and files each under the phases
/// it implements.
pub struct SystemsBuilder<E = ()> {
    systems: Vec<Box<dyn System<E>>>,
    phases: PhaseLists,
    status: SystemStatus,
}

impl<E> SystemsBuilder<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            phases: Default::default(),
            status: SystemStatus::new(),
        }
    }

    /// Handle to the shared enable/disable map. Clones stay valid after
    /// [`SystemsBuilder::build`].
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        self.status.clone()
    }

    /// Register a system. It runs in registration order within every phase
    /// it answers a probe for, and starts enabled.
    #[must_use]
    pub fn add<S: System<E> + 'static>(self, system: S) -> Self {
        self.add_boxed(Box::new(system))
    }

    /// Register an already boxed system.
    #[must_use]
    pub fn add_boxed(mut self, mut system: Box<dyn System<E>>) -> Self {
        let index = self.systems.len();
        let mut joined = Vec::new();
        for phase in Phase::ALL {
            if answers(system.as_mut(), phase) {
                self.phases[phase.index()].push(index);
                joined.push(phase.name());
            }
        }
        debug!(system = system.name(), phases = ?joined, "system registered");
        self.status.register(system.name());
        self.systems.push(system);
        self
    }

    #[must_use]
    pub fn build(self) -> Systems<E> {
        info!(
            systems = self.systems.len(),
            pre_init = self.phases[Phase::PreInit.index()].len(),
            init = self.phases[Phase::Init.index()].len(),
            event = self.phases[Phase::Event.index()].len(),
            run = self.phases[Phase::Run.index()].len(),
            render = self.phases[Phase::Render.index()].len(),
            dispose = self.phases[Phase::Dispose.index()].len(),
            post_dispose = self.phases[Phase::PostDispose.index()].len(),
            "system schedule built"
        );
        Systems {
            systems: self.systems,
            phases: self.phases,
            status: self.status,
        }
    }
}

impl<E> Default for SystemsBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn answers<E>(system: &mut dyn System<E>, phase: Phase) -> bool {
    match phase {
        Phase::PreInit => system.as_pre_init().is_some(),
        Phase::Init => system.as_init().is_some(),
        Phase::Event => system.as_event().is_some(),
        Phase::Run => system.as_run().is_some(),
        Phase::Render => system.as_render().is_some(),
        Phase::Dispose => system.as_dispose().is_some(),
        Phase::PostDispose => system.as_post_dispose().is_some(),
    }
}

/// The built schedule.
///
/// Each phase call walks that phase's list in registration order, skips
/// disabled systems, and finishes with exactly one [`World::update`]. A
/// failing system aborts the phase: later systems do not run and the world
/// is not flushed.
pub struct Systems<E = ()> {
    systems: Vec<Box<dyn System<E>>>,
    phases: PhaseLists,
    status: SystemStatus,
}

impl<E> Systems<E> {
    /// Run `PreInit`, then `Init`.
    ///
    /// # Errors
    ///
    /// Returns the first system error, with the system and phase attached.
    pub fn init(&mut self, world: &mut World) -> Result<()> {
        self.dispatch(Phase::PreInit, world, |system, world| {
            system.as_pre_init().map(|s| s.pre_init(world))
        })?;
        self.dispatch(Phase::Init, world, |system, world| {
            system.as_init().map(|s| s.init(world))
        })
    }

    /// Deliver one host event.
    ///
    /// # Errors
    ///
    /// Returns the first system error, with the system and phase attached.
    pub fn event(&mut self, world: &mut World, event: &E) -> Result<()> {
        self.dispatch(Phase::Event, world, |system, world| {
            system.as_event().map(|s| s.event(world, event))
        })
    }

    /// Run one simulation step of `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns the first system error, with the system and phase attached.
    pub fn run(&mut self, world: &mut World, dt: f64) -> Result<()> {
        self.dispatch(Phase::Run, world, |system, world| {
            system.as_run().map(|s| s.run(world, dt))
        })
    }

    /// # Errors
    ///
    /// Returns the first system error, with the system and phase attached.
    pub fn render(&mut self, world: &mut World) -> Result<()> {
        self.dispatch(Phase::Render, world, |system, world| {
            system.as_render().map(|s| s.render(world))
        })
    }

    /// Run `Dispose`, then `PostDispose`.
    ///
    /// # Errors
    ///
    /// Returns the first system error, with the system and phase attached.
    pub fn dispose(&mut self, world: &mut World) -> Result<()> {
        self.dispatch(Phase::Dispose, world, |system, world| {
            system.as_dispose().map(|s| s.dispose(world))
        })?;
        self.dispatch(Phase::PostDispose, world, |system, world| {
            system.as_post_dispose().map(|s| s.post_dispose(world))
        })
    }

    /// Handle to the shared enable/disable map.
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        self.status.clone()
    }

    /// Names of the systems filed under `phase`, in run order.
    #[must_use]
    pub fn names(&self, phase: Phase) -> Vec<String> {
        self.phases[phase.index()]
            .iter()
            .filter_map(|&index| self.systems.get(index))
            .map(|system| system.name().to_owned())
            .collect()
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn dispatch<F>(&mut self, phase: Phase, world: &mut World, mut call: F) -> Result<()>
    where
        F: FnMut(&mut dyn System<E>, &mut World) -> Option<Result<()>>,
    {
        let Self {
            systems,
            phases,
            status,
        } = self;

        let mut ran = 0usize;
        for &index in &phases[phase.index()] {
            let Some(system) = systems.get_mut(index) else {
                continue;
            };
            if !status.is_enabled(system.name()) {
                trace!(system = system.name(), %phase, "skipping disabled system");
                continue;
            }
            // A probe that stops answering after registration is skipped.
            if let Some(result) = call(system.as_mut(), world) {
                result.with_context(|| format!("system '{}' failed during {phase}", system.name()))?;
                ran += 1;
            }
        }

        world.update();
        trace!(%phase, ran, "phase complete");
        Ok(())
    }
}

impl<E> std::fmt::Debug for Systems<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Systems")
            .field(
                "systems",
                &self.systems.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("status", &self.status)
            .finish()
    }
}
