//! The ECS world: entity lifecycle, pools, queries, and the flush.
//!
//! Every structural change made through the world or a pool only marks the
//! affected entity dirty. [`World::update`] is the single consolidated pass
//! that applies pending deletions and then re-evaluates every query against
//! every dirty entity. Nothing calls it implicitly; the scheduler runs it
//! once after each phase.

use std::collections::BTreeMap;
use std::rc::Rc;

use ecs_component::{Component, ComponentType, Entity};
use tracing::{debug, warn};

use crate::directory::{Directory, SharedDirectory, WorldEvent};
use crate::error::EcsError;
use crate::pool::{ErasedPool, Pool};
use crate::query::QueryBuilder;

/// Owner of entity existence, the type index, all pools and all queries.
///
/// Worlds share nothing with each other; two worlds in one process are fully
/// independent.
pub struct World {
    directory: SharedDirectory,
    /// One pool per component type, created on first request.
    pools: BTreeMap<ComponentType, Box<dyn ErasedPool>>,
    flushes: u64,
}

impl World {
    /// Create a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            directory: Directory::shared(),
            pools: BTreeMap::new(),
            flushes: 0,
        }
    }

    // -- Entity lifecycle --

    /// Allocate a fresh entity and mark it dirty.
    pub fn new_entity(&mut self) -> Entity {
        self.directory.borrow_mut().allocate()
    }

    /// Queue `entity` for deletion at the next flush.
    ///
    /// Deleting twice, or deleting an id the world never issued, is harmless.
    pub fn delete_entity(&mut self, entity: Entity) {
        self.directory
            .borrow_mut()
            .notify(WorldEvent::EntityDeleted(entity));
    }

    /// Live entities in id order. Deleted entities disappear at the flush.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.directory.borrow().entities().iter().copied().collect()
    }

    /// Returns `true` if `entity` was created and not yet flushed out.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.directory.borrow().entities().contains(&entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.directory.borrow().entities().len()
    }

    // -- Component index --

    /// Returns `true` if `entity` owns a component of type `ty`.
    ///
    /// Unknown entities and never-pooled types simply answer `false`.
    #[must_use]
    pub fn has_component(&self, entity: Entity, ty: ComponentType) -> bool {
        self.directory.borrow().has_component(entity, ty)
    }

    /// Typed shorthand for [`World::has_component`].
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.has_component(entity, ComponentType::of::<T>())
    }

    /// Component types currently attached to `entity`, ordered by hash.
    #[must_use]
    pub fn component_types(&self, entity: Entity) -> Vec<ComponentType> {
        self.directory
            .borrow()
            .component_types(entity)
            .into_iter()
            .collect()
    }

    // -- Pools and queries --

    /// The pool for `T`, created on first use and shared afterwards.
    ///
    /// # Errors
    ///
    /// [`EcsError::TypeConflict`] if another Rust type already claimed the
    /// same [`ComponentType`] (for instance through an overridden
    /// [`Component::type_name`]).
    pub fn pool<T: Component>(&mut self) -> Result<Pool<T>, EcsError> {
        let ty = ComponentType::of::<T>();
        let directory = &self.directory;
        let erased = self.pools.entry(ty).or_insert_with(|| {
            debug!(component = %ty, size = ty.size(), "creating pool");
            Box::new(Pool::<T>::new(Rc::clone(directory)))
        });
        erased
            .downcast::<T>()
            .cloned()
            .ok_or(EcsError::TypeConflict { component: ty })
    }

    /// Start building a query bound to this world.
    pub fn build_filter(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.directory)
    }

    /// Number of pools created so far.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Number of registered queries.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.directory.borrow().query_count()
    }

    // -- Flush --

    /// Number of completed [`World::update`] calls.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Entities queued for deletion.
    #[must_use]
    pub fn pending_deletions(&self) -> usize {
        self.directory.borrow().pending_deletions()
    }

    /// Entities awaiting query re-evaluation.
    #[must_use]
    pub fn pending_reevaluations(&self) -> usize {
        self.directory.borrow().pending_reevaluations()
    }

    /// Apply pending deletions, then re-evaluate every query against every
    /// dirty entity.
    ///
    /// Deletion runs first so a deleted entity leaves every query in the same
    /// flush. Query result sets must not be borrowed while this runs.
    pub fn update(&mut self) {
        let doomed = self.directory.borrow_mut().take_deletions();
        for &entity in &doomed {
            let types = self.directory.borrow().component_types(entity);
            for ty in types {
                match self.pools.get(&ty) {
                    Some(pool) if pool.has(entity) => {
                        if let Err(err) = pool.del(entity) {
                            warn!(%entity, %err, "failed to strip component from deleted entity");
                        }
                    }
                    _ => {
                        warn!(%entity, component = %ty, "type index out of sync with pools");
                    }
                }
            }
            self.directory.borrow_mut().forget(entity);
        }

        self.flushes += 1;
        let mut directory = self.directory.borrow_mut();
        let reevaluated = directory.reevaluate();
        if !doomed.is_empty() || reevaluated > 0 {
            debug!(
                flush = self.flushes,
                deleted = doomed.len(),
                reevaluated,
                queries = directory.query_count(),
                "world flushed"
            );
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entity_count())
            .field("pools", &self.pools.keys().map(ComponentType::name).collect::<Vec<_>>())
            .field("queries", &self.query_count())
            .finish()
    }
}
