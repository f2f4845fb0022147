use anyhow::Result;
use ecs_system::{InitSystem, RunSystem, System};
use ecs_world::{Entity, Pool, Query, World};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::components::{
    AsteroidSpawnerTag, AsteroidTag, Cooldown, Lifespan, RotationVelocity, Transform, Velocity,
};
use crate::config::{ArenaConfig, AsteroidConfig, GameConfig, GameplayConfig};
use crate::event::HostEvent;

/// Spawns asteroids at the arena edge, heading inwards.
///
/// A single spawner entity paces the spawning: whenever it carries no
/// [`Cooldown`] it gets a fresh one and, if fewer than
/// `spawn_max_alive` asteroids exist, one asteroid is created. Heavier
/// asteroids are larger and slower.
pub struct SpawnAsteroidSystem {
    arena: ArenaConfig,
    gameplay: GameplayConfig,
    asteroid: AsteroidConfig,
    rng: StdRng,
    state: Option<SpawnState>,
}

struct SpawnState {
    spawners: Query,
    asteroids: Query,
    cooldowns: Pool<Cooldown>,
    tags: Pool<AsteroidTag>,
    transforms: Pool<Transform>,
    velocities: Pool<Velocity>,
    rotations: Pool<RotationVelocity>,
    lifespans: Pool<Lifespan>,
}

impl SpawnAsteroidSystem {
    pub const NAME: &'static str = "spawn_asteroid";

    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            arena: config.arena,
            gameplay: config.gameplay,
            asteroid: config.asteroid,
            rng: StdRng::seed_from_u64(config.seed),
            state: None,
        }
    }
}

impl InitSystem for SpawnAsteroidSystem {
    fn init(&mut self, world: &mut World) -> Result<()> {
        let spawner_tags = world.pool::<AsteroidSpawnerTag>()?;
        let state = SpawnState {
            cooldowns: world.pool()?,
            tags: world.pool()?,
            transforms: world.pool()?,
            velocities: world.pool()?,
            rotations: world.pool()?,
            lifespans: world.pool()?,
            spawners: world
                .build_filter()
                .include::<AsteroidSpawnerTag>()
                .exclude::<Cooldown>()
                .build(),
            asteroids: world.build_filter().include::<AsteroidTag>().build(),
        };

        let spawner = world.new_entity();
        spawner_tags.add_default(spawner)?;
        debug!(%spawner, "asteroid spawner created");

        self.state = Some(state);
        Ok(())
    }
}

impl RunSystem for SpawnAsteroidSystem {
    fn run(&mut self, world: &mut World, _dt: f64) -> Result<()> {
        let state = super::ready(&self.state, Self::NAME)?;
        for spawner in state.spawners.snapshot() {
            state
                .cooldowns
                .add(spawner, Cooldown::new(self.gameplay.spawn_cooldown))?;
            if state.asteroids.len() < self.gameplay.spawn_max_alive {
                let asteroid = state.spawn(world, &mut self.rng, &self.arena, &self.asteroid)?;
                debug!(%asteroid, alive = state.asteroids.len(), "asteroid spawned");
            }
        }
        Ok(())
    }
}

impl System<HostEvent> for SpawnAsteroidSystem {
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

impl SpawnState {
    fn spawn(
        &self,
        world: &mut World,
        rng: &mut StdRng,
        arena: &ArenaConfig,
        config: &AsteroidConfig,
    ) -> Result<Entity> {
        let mass = rng.gen_range(config.mass_min..=config.mass_max);
        let span = config.mass_max - config.mass_min;
        let heaviness = if span > 0.0 {
            (mass - config.mass_min) / span
        } else {
            0.0
        };
        let speed = config.base_speed * (1.0 - 0.5 * heaviness);

        let position = edge_position(rng, arena);
        let target = Vec2::new(
            rng.gen_range(0.2 * arena.width..=0.8 * arena.width),
            rng.gen_range(0.2 * arena.height..=0.8 * arena.height),
        );

        let entity = world.new_entity();
        self.tags.add_default(entity)?;
        self.transforms.add(
            entity,
            Transform {
                position,
                rotation: 0.0,
                scale: mass / config.mass_max,
            },
        )?;
        self.velocities.add(
            entity,
            Velocity {
                value: (target - position).normalize_or_zero() * speed,
            },
        )?;
        self.rotations.add(
            entity,
            RotationVelocity {
                value: rng.gen_range(config.rotation_speed_min..=config.rotation_speed_max),
            },
        )?;
        self.lifespans.add(
            entity,
            Lifespan::new(rng.gen_range(config.lifespan_min..=config.lifespan_max)),
        )?;
        Ok(entity)
    }
}

/// A random point on the arena border.
fn edge_position(rng: &mut StdRng, arena: &ArenaConfig) -> Vec2 {
    let (w, h) = (arena.width, arena.height);
    let p = Vec2::new(
        rng.gen_range(0.01 * w..=0.99 * w),
        rng.gen_range(0.01 * h..=0.99 * h),
    );

    // Snap to the closest side.
    let left = p.x;
    let right = w - p.x;
    let top = p.y;
    let bottom = h - p.y;
    let closest = left.min(right).min(top).min(bottom);
    if closest == left {
        Vec2::new(0.0, p.y)
    } else if closest == right {
        Vec2::new(w, p.y)
    } else if closest == top {
        Vec2::new(p.x, 0.0)
    } else {
        Vec2::new(p.x, h)
    }
}

#[cfg(test)]
mod tests {
    use ecs_system::{Systems, SystemsBuilder};

    use super::*;
    use crate::systems::CooldownTickSystem;

    fn config(max_alive: usize) -> GameConfig {
        let mut config = GameConfig::default();
        config.gameplay.spawn_cooldown = 0.5;
        config.gameplay.spawn_max_alive = max_alive;
        config
    }

    fn schedule(config: &GameConfig) -> Systems<HostEvent> {
        SystemsBuilder::new()
            .add(SpawnAsteroidSystem::new(config))
            .add(CooldownTickSystem::default())
            .build()
    }

    fn asteroid_positions(world: &mut World) -> Vec<Vec2> {
        let transforms = world.pool::<Transform>().unwrap();
        transforms
            .entities()
            .into_iter()
            .map(|e| transforms.get(e).unwrap().position)
            .collect()
    }

    #[test]
    fn test_init_creates_spawner() {
        let config = config(3);
        let mut systems = schedule(&config);
        let mut world = World::new();
        systems.init(&mut world).unwrap();

        let entities = world.entities();
        assert_eq!(entities.len(), 1);
        assert!(world.has::<AsteroidSpawnerTag>(entities[0]));
    }

    #[test]
    fn test_spawning_is_paced_and_capped() {
        let config = config(3);
        let mut systems = schedule(&config);
        let mut world = World::new();
        systems.init(&mut world).unwrap();

        let asteroids = world.pool::<AsteroidTag>().unwrap();

        // Spawn, then one tick of cooldown, then spawn again.
        systems.run(&mut world, 0.5).unwrap();
        assert_eq!(asteroids.len(), 1);
        systems.run(&mut world, 0.5).unwrap();
        assert_eq!(asteroids.len(), 1);
        systems.run(&mut world, 0.5).unwrap();
        assert_eq!(asteroids.len(), 2);

        for _ in 0..20 {
            systems.run(&mut world, 0.5).unwrap();
        }
        assert_eq!(asteroids.len(), 3);
    }

    #[test]
    fn test_asteroids_start_on_the_edge_and_head_inwards() {
        let config = config(5);
        let mut systems = schedule(&config);
        let mut world = World::new();
        systems.init(&mut world).unwrap();
        for _ in 0..10 {
            systems.run(&mut world, 0.5).unwrap();
        }

        let transforms = world.pool::<Transform>().unwrap();
        let velocities = world.pool::<Velocity>().unwrap();
        let lifespans = world.pool::<Lifespan>().unwrap();
        let (w, h) = (config.arena.width, config.arena.height);
        assert_eq!(transforms.len(), 5);
        for e in transforms.entities() {
            let p = transforms.get(e).unwrap().position;
            assert!(p.x == 0.0 || p.x == w || p.y == 0.0 || p.y == h, "{p} not on edge");

            let v = velocities.get(e).unwrap().value;
            let centre = Vec2::new(w / 2.0, h / 2.0);
            assert!(v.dot(centre - p) > 0.0, "asteroid at {p} moving away");
            assert!(v.length() <= config.asteroid.base_speed + 1e-3);

            let l = lifespans.get(e).unwrap();
            assert!(l.total >= config.asteroid.lifespan_min);
            assert!(l.total <= config.asteroid.lifespan_max);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let config = config(4);
        let field = || {
            let mut systems = schedule(&config);
            let mut world = World::new();
            systems.init(&mut world).unwrap();
            for _ in 0..8 {
                systems.run(&mut world, 0.5).unwrap();
            }
            asteroid_positions(&mut world)
        };
        assert_eq!(field(), field());
    }

    #[test]
    fn test_run_before_init_fails() {
        let mut system = SpawnAsteroidSystem::new(&GameConfig::default());
        let mut world = World::new();
        let err = system.run(&mut world, 0.1).unwrap_err();
        assert_eq!(err.to_string(), "spawn_asteroid used before init");
    }
}
