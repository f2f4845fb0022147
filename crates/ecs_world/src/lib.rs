//! # ecs_world
//!
//! Typed sparse component storage plus live, incrementally maintained
//! queries, tied together by a world that flushes structural changes only
//! when asked to.
//!
//! This crate provides:
//!
//! - [`World`]: entity lifecycle, lazy per-type pools, and the flush.
//! - [`Pool`]: storage handle for one component type.
//! - [`Query`] / [`QueryBuilder`]: include/exclude filters over component types.
//! - [`EcsError`]: the fail-fast errors pool operations can raise.
//!
//! ## Deferred visibility
//!
//! ```rust
//! use ecs_component::Component;
//! use ecs_world::World;
//!
//! #[derive(Default)]
//! struct Alive;
//! impl Component for Alive {}
//!
//! let mut world = World::new();
//! let alive = world.pool::<Alive>().unwrap();
//! let query = world.build_filter().include::<Alive>().build();
//!
//! let e = world.new_entity();
//! alive.add_default(e).unwrap();
//! assert!(query.is_empty());
//!
//! world.update();
//! assert!(query.contains(e));
//! ```

mod directory;
pub mod error;
pub mod pool;
pub mod query;
pub mod world;

pub use ecs_component::{Component, ComponentType, Entity};
pub use error::EcsError;
pub use pool::Pool;
pub use query::{Query, QueryBuilder};
pub use world::World;
