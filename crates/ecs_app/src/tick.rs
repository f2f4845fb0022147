//! Host tick loop.
//!
//! Drives the schedule through its lifetime:
//!
//! 1. [`TickLoop::start`] runs the init phases once.
//! 2. Each [`TickLoop::tick`] delivers queued host events, one event phase
//!    per event, then runs the run and render phases.
//! 3. [`TickLoop::shutdown`] runs the dispose phases once.
//!
//! [`TickLoop::run`] repeats step 2 at a fixed rate until the tick limit is
//! reached or a [`HostEvent::Quit`] arrives.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use ecs_system::{SystemStatus, Systems};
use ecs_world::World;
use tracing::{debug, info, warn};

use crate::event::HostEvent;

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The host's tick loop state.
#[derive(Debug)]
pub struct TickLoop {
    /// Ticks completed so far.
    tick_id: u64,
    config: TickConfig,
    world: World,
    systems: Systems<HostEvent>,
    /// Events for the next tick, in arrival order.
    events: VecDeque<HostEvent>,
    /// Events held back until their tick comes up.
    scheduled: BTreeMap<u64, Vec<HostEvent>>,
    quit: bool,
}

impl TickLoop {
    #[must_use]
    pub fn new(config: TickConfig, systems: Systems<HostEvent>) -> Self {
        Self {
            tick_id: 0,
            config,
            world: World::new(),
            systems,
            events: VecDeque::new(),
            scheduled: BTreeMap::new(),
            quit: false,
        }
    }

    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Handle to the schedule's enable/disable map.
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        self.systems.status()
    }

    /// Returns `true` once a [`HostEvent::Quit`] has been delivered.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Queue an event for the next tick.
    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push_back(event);
    }

    /// Queue an event for tick `tick` (counting from 1). Past ticks deliver
    /// on the next tick.
    pub fn schedule_event(&mut self, tick: u64, event: HostEvent) {
        self.scheduled.entry(tick).or_default().push(event);
    }

    /// Run the init phases.
    ///
    /// # Errors
    ///
    /// Returns the first system error.
    pub fn start(&mut self) -> Result<()> {
        self.systems.init(&mut self.world)?;
        info!(
            systems = self.systems.len(),
            entities = self.world.entity_count(),
            "simulation started"
        );
        Ok(())
    }

    /// Run one tick of `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns the first system error. The event whose phase failed is
    /// dropped and the events behind it stay queued for the next tick.
    pub fn tick(&mut self, dt: f64) -> Result<()> {
        self.tick_id += 1;

        let due: Vec<u64> = self
            .scheduled
            .range(..=self.tick_id)
            .map(|(&tick, _)| tick)
            .collect();
        for tick in due {
            for event in self.scheduled.remove(&tick).unwrap_or_default() {
                self.push_event(event);
            }
        }

        let delivered = self.events.len();
        while let Some(event) = self.events.pop_front() {
            self.systems.event(&mut self.world, &event)?;
            if event == HostEvent::Quit {
                self.quit = true;
            }
        }

        self.systems.run(&mut self.world, dt)?;
        self.systems.render(&mut self.world)?;

        debug!(
            tick_id = self.tick_id,
            dt,
            events = delivered,
            entities = self.world.entity_count(),
            "tick complete"
        );
        Ok(())
    }

    /// Run the dispose phases.
    ///
    /// # Errors
    ///
    /// Returns the first system error.
    pub fn shutdown(&mut self) -> Result<()> {
        self.systems.dispose(&mut self.world)?;
        info!(ticks = self.tick_id, "simulation shut down");
        Ok(())
    }

    /// Tick at the configured rate until `max_ticks` ticks ran or a quit
    /// event was delivered.
    ///
    /// # Errors
    ///
    /// Returns an error for a tick rate that is not positive or whose period
    /// does not fit a [`Duration`], or the first system error.
    pub fn run(&mut self) -> Result<()> {
        ensure!(
            self.config.tick_rate > 0.0,
            "tick rate must be positive, got {}",
            self.config.tick_rate
        );
        let tick_duration = Duration::try_from_secs_f64(1.0 / self.config.tick_rate)
            .with_context(|| format!("tick rate {} is too low", self.config.tick_rate))?;
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration.as_secs_f64())?;

            tick_count += 1;
            if self.quit {
                info!(ticks = tick_count, "quit requested");
                break;
            }
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }

    /// [`run`](Self::run), then [`shutdown`](Self::shutdown) whatever the
    /// outcome of the run.
    ///
    /// # Errors
    ///
    /// Returns the run error if there was one, else the shutdown error. A
    /// shutdown error that follows a run error is logged.
    pub fn run_to_completion(&mut self) -> Result<()> {
        let outcome = self.run();
        let shutdown = self.shutdown();
        match (outcome, shutdown) {
            (Err(err), Err(shutdown_err)) => {
                warn!(
                    error = %format_args!("{shutdown_err:#}"),
                    "shutdown after failed run also failed"
                );
                Err(err)
            }
            (outcome, shutdown) => outcome.and(shutdown),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::bail;
    use ecs_system::{DisposeSystem, EventSystem, RenderSystem, RunSystem, System, SystemsBuilder};

    use super::*;
    use crate::config::GameConfig;
    use crate::systems::{self, ControlSystem, MoveSystem};

    type Log = Rc<RefCell<Vec<String>>>;

    /// Logs every event and phase it sees.
    struct Recorder(Log);

    impl EventSystem<HostEvent> for Recorder {
        fn event(&mut self, _world: &mut World, event: &HostEvent) -> Result<()> {
            self.0.borrow_mut().push(format!("{event:?}"));
            Ok(())
        }
    }

    impl RunSystem for Recorder {
        fn run(&mut self, _world: &mut World, _dt: f64) -> Result<()> {
            self.0.borrow_mut().push("run".to_string());
            Ok(())
        }
    }

    impl RenderSystem for Recorder {
        fn render(&mut self, _world: &mut World) -> Result<()> {
            self.0.borrow_mut().push("render".to_string());
            Ok(())
        }
    }

    impl System<HostEvent> for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn as_event(&mut self) -> Option<&mut dyn EventSystem<HostEvent>> {
            Some(self)
        }
        fn as_run(&mut self) -> Option<&mut dyn RunSystem> {
            Some(self)
        }
        fn as_render(&mut self) -> Option<&mut dyn RenderSystem> {
            Some(self)
        }
    }

    /// Fails every phase it joins and logs the dispose attempt.
    struct Broken(Log);

    impl EventSystem<HostEvent> for Broken {
        fn event(&mut self, _world: &mut World, event: &HostEvent) -> Result<()> {
            if let HostEvent::ToggleSystem(name) = event {
                bail!("cannot toggle {name}");
            }
            Ok(())
        }
    }

    impl RunSystem for Broken {
        fn run(&mut self, _world: &mut World, _dt: f64) -> Result<()> {
            bail!("run broke")
        }
    }

    impl DisposeSystem for Broken {
        fn dispose(&mut self, _world: &mut World) -> Result<()> {
            self.0.borrow_mut().push("dispose".to_string());
            bail!("dispose broke")
        }
    }

    impl System<HostEvent> for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn as_event(&mut self) -> Option<&mut dyn EventSystem<HostEvent>> {
            Some(self)
        }
        fn as_run(&mut self) -> Option<&mut dyn RunSystem> {
            Some(self)
        }
        fn as_dispose(&mut self) -> Option<&mut dyn DisposeSystem> {
            Some(self)
        }
    }

    fn broken_loop(config: TickConfig) -> (TickLoop, Log) {
        let log = Log::default();
        let systems = SystemsBuilder::new().add(Broken(Rc::clone(&log))).build();
        (TickLoop::new(config, systems), log)
    }

    fn recording_loop(config: TickConfig) -> (TickLoop, Log) {
        let log = Log::default();
        let systems = SystemsBuilder::new().add(Recorder(Rc::clone(&log))).build();
        (TickLoop::new(config, systems), log)
    }

    #[test]
    fn test_tick_advances_counter() {
        let (mut tick_loop, _) = recording_loop(TickConfig::default());
        assert_eq!(tick_loop.tick_id(), 0);
        tick_loop.tick(1.0 / 60.0).unwrap();
        assert_eq!(tick_loop.tick_id(), 1);
        tick_loop.tick(1.0 / 60.0).unwrap();
        assert_eq!(tick_loop.tick_id(), 2);
    }

    #[test]
    fn test_events_precede_run_and_render() {
        let (mut tick_loop, log) = recording_loop(TickConfig::default());
        tick_loop.start().unwrap();
        tick_loop.push_event(HostEvent::ToggleSystem("x".to_string()));
        tick_loop.push_event(HostEvent::Quit);

        tick_loop.tick(0.1).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![r#"ToggleSystem("x")"#, "Quit", "run", "render"]
        );
        assert!(tick_loop.quit_requested());
        // One flush per event phase, plus run, render and the two init phases.
        assert_eq!(tick_loop.world().flush_count(), 6);
    }

    #[test]
    fn test_run_limited_ticks() {
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks: 5,
        };
        let (mut tick_loop, _) = recording_loop(config);
        tick_loop.run().unwrap();
        assert_eq!(tick_loop.tick_id(), 5);
    }

    #[test]
    fn test_quit_stops_run_early() {
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks: 100,
        };
        let (mut tick_loop, _) = recording_loop(config);
        tick_loop.schedule_event(3, HostEvent::Quit);
        tick_loop.run().unwrap();
        assert_eq!(tick_loop.tick_id(), 3);
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let config = TickConfig {
            tick_rate: 0.0,
            max_ticks: 1,
        };
        let (mut tick_loop, _) = recording_loop(config);
        assert!(tick_loop.run().is_err());
        assert_eq!(tick_loop.tick_id(), 0);
    }

    #[test]
    fn test_tiny_tick_rate_rejected() {
        let config = TickConfig {
            tick_rate: 1e-30,
            max_ticks: 1,
        };
        let (mut tick_loop, _) = recording_loop(config);
        let err = tick_loop.run().unwrap_err();
        assert!(err.to_string().ends_with("is too low"));
        assert_eq!(tick_loop.tick_id(), 0);
    }

    #[test]
    fn test_failed_event_keeps_later_events_queued() {
        let (mut tick_loop, _) = broken_loop(TickConfig::default());
        tick_loop.push_event(HostEvent::ToggleSystem("move".to_string()));
        tick_loop.push_event(HostEvent::Quit);

        let err = tick_loop.tick(0.1).unwrap_err();
        assert_eq!(err.root_cause().to_string(), "cannot toggle move");
        assert!(!tick_loop.quit_requested());
        assert_eq!(tick_loop.events, VecDeque::from([HostEvent::Quit]));
    }

    #[test]
    fn test_run_to_completion_shuts_down_after_failure() {
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks: 3,
        };
        let (mut tick_loop, log) = broken_loop(config);

        let err = tick_loop.run_to_completion().unwrap_err();

        assert_eq!(err.root_cause().to_string(), "run broke");
        assert_eq!(*log.borrow(), vec!["dispose"]);
        assert_eq!(tick_loop.tick_id(), 1);
    }

    #[test]
    fn test_run_to_completion_runs_then_shuts_down() {
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks: 2,
        };
        let (mut tick_loop, log) = recording_loop(config);
        tick_loop.run_to_completion().unwrap();
        assert_eq!(tick_loop.tick_id(), 2);
        assert_eq!(log.borrow().iter().filter(|l| *l == "run").count(), 2);
    }

    #[test]
    fn test_scheduled_toggle_applies_on_its_tick() {
        let builder = SystemsBuilder::new();
        let status = builder.status();
        let systems = builder
            .add(ControlSystem::new(status))
            .add(MoveSystem::default())
            .build();
        let mut tick_loop = TickLoop::new(TickConfig::default(), systems);
        tick_loop.schedule_event(2, HostEvent::ToggleSystem(MoveSystem::NAME.to_string()));
        tick_loop.start().unwrap();

        tick_loop.tick(0.1).unwrap();
        assert!(tick_loop.status().is_enabled(MoveSystem::NAME));
        tick_loop.tick(0.1).unwrap();
        assert!(!tick_loop.status().is_enabled(MoveSystem::NAME));
    }

    #[test]
    fn test_full_simulation_lifecycle() {
        let mut config = GameConfig::default();
        config.gameplay.spawn_cooldown = 0.1;
        config.gameplay.spawn_max_alive = 5;
        config.asteroid.lifespan_min = 0.5;
        config.asteroid.lifespan_max = 1.0;
        let (systems, report) = systems::build(&config);
        let mut tick_loop = TickLoop::new(TickConfig::default(), systems);

        tick_loop.start().unwrap();
        for _ in 0..120 {
            tick_loop.tick(0.05).unwrap();
            assert!(report.get().asteroids <= 5);
        }
        let snapshot = report.get();
        assert_eq!(snapshot.renders, 120);
        assert!(snapshot.peak_asteroids > 0);

        tick_loop.shutdown().unwrap();
        assert_eq!(tick_loop.world().entity_count(), 0);
    }
}
