//! System capability traits.
//!
//! A system implements any subset of the phase traits below and advertises
//! them through the `as_*` probes on [`System`]. The scheduler probes each
//! system once when it is added and files it under every phase it answered
//! for, so there is no type inspection after registration.
//!
//! ```rust
//! use anyhow::Result;
//! use ecs_system::{InitSystem, RunSystem, System};
//! use ecs_world::World;
//!
//! struct Counter(u32);
//!
//! impl InitSystem for Counter {
//!     fn init(&mut self, _world: &mut World) -> Result<()> {
//!         self.0 = 0;
//!         Ok(())
//!     }
//! }
//!
//! impl RunSystem for Counter {
//!     fn run(&mut self, _world: &mut World, _dt: f64) -> Result<()> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//!
//! impl System for Counter {
//!     fn name(&self) -> &str {
//!         "counter"
//!     }
//!     fn as_init(&mut self) -> Option<&mut dyn InitSystem> {
//!         Some(self)
//!     }
//!     fn as_run(&mut self) -> Option<&mut dyn RunSystem> {
//!         Some(self)
//!     }
//! }
//! ```

use anyhow::Result;
use ecs_world::World;

/// Runs once before [`InitSystem`], typically to seed shared resources.
pub trait PreInitSystem {
    fn pre_init(&mut self, world: &mut World) -> Result<()>;
}

/// Runs once at startup. The place to fetch pools and build queries.
pub trait InitSystem {
    fn init(&mut self, world: &mut World) -> Result<()>;
}

/// Receives each external event the host polls, one phase per event.
pub trait EventSystem<E> {
    fn event(&mut self, world: &mut World, event: &E) -> Result<()>;
}

/// Runs once per tick with the elapsed time in seconds.
pub trait RunSystem {
    fn run(&mut self, world: &mut World, dt: f64) -> Result<()>;
}

/// Runs once per tick after [`RunSystem`].
pub trait RenderSystem {
    fn render(&mut self, world: &mut World) -> Result<()>;
}

/// Runs once at shutdown.
pub trait DisposeSystem {
    fn dispose(&mut self, world: &mut World) -> Result<()>;
}

/// Runs once after [`DisposeSystem`].
pub trait PostDisposeSystem {
    fn post_dispose(&mut self, world: &mut World) -> Result<()>;
}

/// A schedulable system.
///
/// `E` is the host's event type, delivered to [`EventSystem`]s. Each probe
/// defaults to `None`; override the ones for the phases this system takes
/// part in and return `Some(self)`.
pub trait System<E = ()> {
    /// Stable name, used as the key for enable/disable.
    fn name(&self) -> &str;

    fn as_pre_init(&mut self) -> Option<&mut dyn PreInitSystem> {
        None
    }

    fn as_init(&mut self) -> Option<&mut dyn InitSystem> {
        None
    }

    fn as_event(&mut self) -> Option<&mut dyn EventSystem<E>> {
        None
    }

    fn as_run(&mut self) -> Option<&mut dyn RunSystem> {
        None
    }

    fn as_render(&mut self) -> Option<&mut dyn RenderSystem> {
        None
    }

    fn as_dispose(&mut self) -> Option<&mut dyn DisposeSystem> {
        None
    }

    fn as_post_dispose(&mut self) -> Option<&mut dyn PostDisposeSystem> {
        None
    }
}
