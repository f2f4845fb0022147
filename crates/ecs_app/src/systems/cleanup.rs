use anyhow::{Result, ensure};
use ecs_system::{DisposeSystem, PostDisposeSystem, System};
use ecs_world::World;
use tracing::{debug, info};

use crate::event::HostEvent;

/// Deletes every entity at shutdown, then checks the flush left nothing
/// behind.
#[derive(Debug, Default, Clone, Copy)]
pub struct CleanupSystem;

impl CleanupSystem {
    pub const NAME: &'static str = "cleanup";
}

impl DisposeSystem for CleanupSystem {
    fn dispose(&mut self, world: &mut World) -> Result<()> {
        let entities = world.entities();
        debug!(count = entities.len(), "deleting remaining entities");
        for entity in entities {
            world.delete_entity(entity);
        }
        Ok(())
    }
}

impl PostDisposeSystem for CleanupSystem {
    fn post_dispose(&mut self, world: &mut World) -> Result<()> {
        let left = world.entity_count();
        ensure!(left == 0, "{left} entities survived cleanup");
        info!(pools = world.pool_count(), queries = world.query_count(), "world cleared");
        Ok(())
    }
}

impl System<HostEvent> for CleanupSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn as_dispose(&mut self) -> Option<&mut dyn DisposeSystem> {
        Some(self)
    }

    fn as_post_dispose(&mut self) -> Option<&mut dyn PostDisposeSystem> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use ecs_system::SystemsBuilder;

    use super::*;
    use crate::components::{Lifespan, Transform};

    #[test]
    fn test_dispose_empties_world() {
        let mut systems = SystemsBuilder::<HostEvent>::new()
            .add(CleanupSystem)
            .build();
        let mut world = World::new();
        let transforms = world.pool::<Transform>().unwrap();
        let lifespans = world.pool::<Lifespan>().unwrap();
        let query = world.build_filter().include::<Transform>().build();
        for _ in 0..4 {
            let e = world.new_entity();
            transforms.add(e, Transform::default()).unwrap();
            lifespans.add(e, Lifespan::new(1.0)).unwrap();
        }
        world.update();
        assert_eq!(query.len(), 4);

        systems.dispose(&mut world).unwrap();

        assert_eq!(world.entity_count(), 0);
        assert!(transforms.is_empty());
        assert!(lifespans.is_empty());
        assert!(query.is_empty());
    }

    #[test]
    fn test_post_dispose_reports_survivors() {
        let mut world = World::new();
        world.new_entity();
        let err = CleanupSystem.post_dispose(&mut world).unwrap_err();
        assert_eq!(err.to_string(), "1 entities survived cleanup");
    }
}
