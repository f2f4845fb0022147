use anyhow::Result;
use ecs_system::{InitSystem, RunSystem, System};
use ecs_world::{Component, Pool, Query, World};

use crate::components::{RotationVelocity, Transform, Velocity};
use crate::event::HostEvent;

struct Motion<V: Component> {
    query: Query,
    transforms: Pool<Transform>,
    velocities: Pool<V>,
}

impl<V: Component> Motion<V> {
    fn new(world: &mut World) -> Result<Self> {
        Ok(Self {
            query: world
                .build_filter()
                .include::<Transform>()
                .include::<V>()
                .build(),
            transforms: world.pool()?,
            velocities: world.pool()?,
        })
    }
}

/// Integrates [`Velocity`] into [`Transform::position`].
#[derive(Default)]
pub struct MoveSystem {
    state: Option<Motion<Velocity>>,
}

impl MoveSystem {
    pub const NAME: &'static str = "move";
}

impl InitSystem for MoveSystem {
    fn init(&mut self, world: &mut World) -> Result<()> {
        self.state = Some(Motion::new(world)?);
        Ok(())
    }
}

impl RunSystem for MoveSystem {
    fn run(&mut self, _world: &mut World, dt: f64) -> Result<()> {
        let state = super::ready(&self.state, Self::NAME)?;
        let dt = dt as f32;
        for &entity in state.query.entities().iter() {
            let velocity = state.velocities.get(entity)?.value;
            state.transforms.get_mut(entity)?.position += velocity * dt;
        }
        Ok(())
    }
}

impl System<HostEvent> for MoveSystem {
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

/// Integrates [`RotationVelocity`] into [`Transform::rotation`], wrapping
/// into `[0, 360)`.
#[derive(Default)]
pub struct RotateSystem {
    state: Option<Motion<RotationVelocity>>,
}

impl RotateSystem {
    pub const NAME: &'static str = "rotate";
}

impl InitSystem for RotateSystem {
    fn init(&mut self, world: &mut World) -> Result<()> {
        self.state = Some(Motion::new(world)?);
        Ok(())
    }
}

impl RunSystem for RotateSystem {
    fn run(&mut self, _world: &mut World, dt: f64) -> Result<()> {
        let state = super::ready(&self.state, Self::NAME)?;
        let dt = dt as f32;
        for &entity in state.query.entities().iter() {
            let speed = state.velocities.get(entity)?.value;
            let mut transform = state.transforms.get_mut(entity)?;
            transform.rotation = (transform.rotation + speed * dt).rem_euclid(360.0);
        }
        Ok(())
    }
}

impl System<HostEvent> for RotateSystem {
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
