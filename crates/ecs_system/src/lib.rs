//! # ecs_system
//!
//! Phase-based scheduling on top of [`ecs_world`].
//!
//! Systems implement any subset of the phase traits and advertise them
//! through [`System`]. [`SystemsBuilder`] files every system under the phases
//! it answers for; the resulting [`Systems`] runs one phase at a time,
//! skipping systems disabled in the shared [`SystemStatus`], and flushes the
//! world once at the end of each phase.
//!
//! ```rust
//! use anyhow::Result;
//! use ecs_system::{RunSystem, System, SystemsBuilder};
//! use ecs_world::World;
//!
//! struct Tick(u64);
//!
//! impl RunSystem for Tick {
//!     fn run(&mut self, _world: &mut World, _dt: f64) -> Result<()> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//!
//! impl System for Tick {
//!     fn name(&self) -> &str {
//!         "tick"
//!     }
//!     fn as_run(&mut self) -> Option<&mut dyn RunSystem> {
//!         Some(self)
//!     }
//! }
//!
//! let mut world = World::new();
//! let mut systems = SystemsBuilder::new().add(Tick(0)).build();
//! systems.init(&mut world)?;
//! systems.run(&mut world, 1.0 / 60.0)?;
//! systems.dispose(&mut world)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod phase;
pub mod status;
pub mod system;
pub mod systems;

pub use phase::Phase;
pub use status::SystemStatus;
pub use system::{
    DisposeSystem, EventSystem, InitSystem, PostDisposeSystem, PreInitSystem, RenderSystem,
    RunSystem, System,
};
pub use systems::{Systems, SystemsBuilder};
