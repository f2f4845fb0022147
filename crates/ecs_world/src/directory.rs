//! Entity directory: entity lifecycle, the entity → component-type index,
//! the dirty sets, and the registered queries.
//!
//! Pools and the world never touch these tables directly. They report what
//! happened as a [`WorldEvent`] and the directory turns it into index updates
//! and dirty marks. Nothing is re-evaluated until the world flushes.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use ecs_component::{ComponentType, Entity, EntityAllocator};
use tracing::trace;

use crate::query::Query;

/// Directory handle shared between a world and the pools it created.
pub(crate) type SharedDirectory = Rc<RefCell<Directory>>;

/// A structural change reported to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorldEvent {
    EntityCreated(Entity),
    ComponentAdded(Entity, ComponentType),
    ComponentRemoved(Entity, ComponentType),
    EntityDeleted(Entity),
}

#[derive(Debug, Default)]
pub(crate) struct Directory {
    allocator: EntityAllocator,
    /// Live entities. Deleted ids leave this set at the next flush.
    entities: BTreeSet<Entity>,
    type_sets: BTreeMap<Entity, BTreeSet<ComponentType>>,
    to_delete: BTreeSet<Entity>,
    to_reevaluate: BTreeSet<Entity>,
    queries: Vec<Query>,
}

impl Directory {
    pub(crate) fn shared() -> SharedDirectory {
        Rc::new(RefCell::new(Self::default()))
    }

    pub(crate) fn notify(&mut self, event: WorldEvent) {
        match event {
            WorldEvent::EntityCreated(entity) => {
                self.entities.insert(entity);
                self.to_reevaluate.insert(entity);
            }
            WorldEvent::ComponentAdded(entity, ty) => {
                self.type_sets.entry(entity).or_default().insert(ty);
                self.to_reevaluate.insert(entity);
            }
            WorldEvent::ComponentRemoved(entity, ty) => {
                if let Some(types) = self.type_sets.get_mut(&entity) {
                    types.remove(&ty);
                }
                self.to_reevaluate.insert(entity);
            }
            WorldEvent::EntityDeleted(entity) => {
                self.to_delete.insert(entity);
                self.to_reevaluate.insert(entity);
            }
        }
    }

    pub(crate) fn allocate(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.notify(WorldEvent::EntityCreated(entity));
        entity
    }

    pub(crate) fn has_component(&self, entity: Entity, ty: ComponentType) -> bool {
        self.type_sets
            .get(&entity)
            .is_some_and(|types| types.contains(&ty))
    }

    pub(crate) fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub(crate) fn component_types(&self, entity: Entity) -> BTreeSet<ComponentType> {
        self.type_sets.get(&entity).cloned().unwrap_or_default()
    }

    pub(crate) fn entities(&self) -> &BTreeSet<Entity> {
        &self.entities
    }

    pub(crate) fn pending_deletions(&self) -> usize {
        self.to_delete.len()
    }

    pub(crate) fn pending_reevaluations(&self) -> usize {
        self.to_reevaluate.len()
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// Drain the deletion queue. Deleted entities stay in `to_reevaluate`.
    pub(crate) fn take_deletions(&mut self) -> BTreeSet<Entity> {
        std::mem::take(&mut self.to_delete)
    }

    /// Drop every trace of a deleted entity from the index and the live set.
    pub(crate) fn forget(&mut self, entity: Entity) {
        self.type_sets.remove(&entity);
        self.entities.remove(&entity);
    }

    /// Register a query and give it a first pass over the current dirty set.
    ///
    /// Entities that are not dirty right now are not visited; they join the
    /// query the next time they are touched.
    pub(crate) fn register(&mut self, query: Query) {
        for &entity in &self.to_reevaluate {
            query.update(entity, self);
        }
        self.queries.push(query);
    }

    /// Re-check every dirty entity against every query, then clear the set.
    /// Returns the number of entities visited.
    pub(crate) fn reevaluate(&mut self) -> usize {
        let dirty = std::mem::take(&mut self.to_reevaluate);
        for &entity in &dirty {
            trace!(%entity, queries = self.queries.len(), "re-evaluating entity");
            for query in &self.queries {
                query.update(entity, self);
            }
        }
        dirty.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ComponentType = ComponentType::new("A", 4);
    const B: ComponentType = ComponentType::new("B", 8);

    #[test]
    fn test_allocate_marks_dirty() {
        let mut dir = Directory::default();
        let e = dir.allocate();
        assert_eq!(e, Entity(1));
        assert!(dir.entities().contains(&e));
        assert_eq!(dir.pending_reevaluations(), 1);
    }

    #[test]
    fn test_component_events_update_index() {
        let mut dir = Directory::default();
        let e = dir.allocate();
        dir.notify(WorldEvent::ComponentAdded(e, A));
        dir.notify(WorldEvent::ComponentAdded(e, B));
        assert!(dir.has_component(e, A));
        assert!(dir.has_component(e, B));

        dir.notify(WorldEvent::ComponentRemoved(e, A));
        assert!(!dir.has_component(e, A));
        assert_eq!(dir.component_types(e), BTreeSet::from([B]));
    }

    #[test]
    fn test_has_component_unknown_entity() {
        let dir = Directory::default();
        assert!(!dir.has_component(Entity(99), A));
        assert!(dir.component_types(Entity(99)).is_empty());
    }

    #[test]
    fn test_deletion_is_queued_not_applied() {
        let mut dir = Directory::default();
        let e = dir.allocate();
        dir.notify(WorldEvent::ComponentAdded(e, A));
        dir.notify(WorldEvent::EntityDeleted(e));
        dir.notify(WorldEvent::EntityDeleted(e));

        assert!(dir.has_component(e, A));
        assert_eq!(dir.pending_deletions(), 1);

        let doomed = dir.take_deletions();
        assert_eq!(doomed, BTreeSet::from([e]));
        assert_eq!(dir.pending_deletions(), 0);
        // The deleted entity still awaits re-evaluation.
        assert_eq!(dir.pending_reevaluations(), 1);
    }

    #[test]
    fn test_forget_removes_entity() {
        let mut dir = Directory::default();
        let e = dir.allocate();
        dir.notify(WorldEvent::ComponentAdded(e, A));
        dir.forget(e);
        assert!(!dir.entities().contains(&e));
        assert!(!dir.has_component(e, A));
    }

    #[test]
    fn test_reevaluate_clears_dirty_set() {
        let mut dir = Directory::default();
        dir.allocate();
        dir.allocate();
        assert_eq!(dir.reevaluate(), 2);
        assert_eq!(dir.pending_reevaluations(), 0);
        assert_eq!(dir.reevaluate(), 0);
    }
}
