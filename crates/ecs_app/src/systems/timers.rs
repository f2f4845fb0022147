//! Countdown components ticked by elapsed time.

use anyhow::Result;
use ecs_system::{InitSystem, RunSystem, System};
use ecs_world::{Pool, Query, World};
use tracing::trace;

use crate::components::{Cooldown, Lifespan};
use crate::event::HostEvent;

/// Counts [`Cooldown`]s down and removes them once they expire.
#[derive(Default)]
pub struct CooldownTickSystem {
    state: Option<(Query, Pool<Cooldown>)>,
}

impl CooldownTickSystem {
    pub const NAME: &'static str = "cooldown_tick";
}

impl InitSystem for CooldownTickSystem {
    fn init(&mut self, world: &mut World) -> Result<()> {
        let query = world.build_filter().include::<Cooldown>().build();
        self.state = Some((query, world.pool()?));
        Ok(())
    }
}

impl RunSystem for CooldownTickSystem {
    fn run(&mut self, _world: &mut World, dt: f64) -> Result<()> {
        let (query, cooldowns) = super::ready(&self.state, Self::NAME)?;
        for &entity in query.entities().iter() {
            let expired = {
                let mut cooldown = cooldowns.get_mut(entity)?;
                cooldown.current -= dt as f32;
                cooldown.current <= 0.0
            };
            if expired {
                cooldowns.del(entity)?;
                trace!(%entity, "cooldown expired");
            }
        }
        Ok(())
    }
}

impl System<HostEvent> for CooldownTickSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn as_init(&mut self) -> Option<&mut dyn InitSystem> {
        Some(self)
    }

    fn as_run(&mut self) -> Option<&mut dyn RunSystem> {
        Some(self)
    }
}

/// Counts [`Lifespan`]s down and deletes entities whose time is up.
#[derive(Default)]
pub struct LifespanTickSystem {
    state: Option<(Query, Pool<Lifespan>)>,
}

impl LifespanTickSystem {
    pub const NAME: &'static str = "lifespan_tick";
}

impl InitSystem for LifespanTickSystem {
    fn init(&mut self, world: &mut World) -> Result<()> {
        let query = world.build_filter().include::<Lifespan>().build();
        self.state = Some((query, world.pool()?));
        Ok(())
    }
}

impl RunSystem for LifespanTickSystem {
    fn run(&mut self, world: &mut World, dt: f64) -> Result<()> {
        let (query, lifespans) = super::ready(&self.state, Self::NAME)?;
        for &entity in query.entities().iter() {
            let mut lifespan = lifespans.get_mut(entity)?;
            lifespan.current -= dt as f32;
            if lifespan.current <= 0.0 {
                world.delete_entity(entity);
                trace!(%entity, "lifespan over");
            }
        }
        Ok(())
    }
}

impl System<HostEvent> for LifespanTickSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn as_init(&mut self) -> Option<&mut dyn InitSystem> {
        Some(self)
    }

    fn as_run(&mut self) -> Option<&mut dyn RunSystem> {
        Some(self)
    }
}
