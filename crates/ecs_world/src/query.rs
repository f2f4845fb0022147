//! Live queries and their builder.
//!
//! A [`Query`] holds an include/exclude predicate over component types and a
//! materialised set of matching entities. The set is maintained incrementally:
//! the world re-checks only the entities marked dirty since the last flush.
//! Between flushes the set reflects the state as of the previous flush.

use std::cell::{Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use ecs_component::{Component, ComponentType, Entity};
use tracing::debug;

use crate::directory::{Directory, SharedDirectory};

#[derive(Debug)]
struct QueryState {
    include: Vec<ComponentType>,
    exclude: Vec<ComponentType>,
    entities: BTreeSet<Entity>,
}

/// A live, incrementally maintained set of entities matching a predicate.
///
/// `Query` is a cheap cloneable handle; the world keeps its own clone to feed
/// re-evaluations, so the result set mutates in place across flushes.
#[derive(Debug, Clone)]
pub struct Query {
    state: Rc<RefCell<QueryState>>,
}

impl Query {
    fn new(include: Vec<ComponentType>, exclude: Vec<ComponentType>) -> Self {
        Self {
            state: Rc::new(RefCell::new(QueryState {
                include,
                exclude,
                entities: BTreeSet::new(),
            })),
        }
    }

    /// Live view of the matching entities, in id order.
    ///
    /// The borrow must be released before the next
    /// [`World::update`](crate::World::update).
    #[must_use]
    pub fn entities(&self) -> Ref<'_, BTreeSet<Entity>> {
        Ref::map(self.state.borrow(), |state| &state.entities)
    }

    /// Copy of the matching entities, in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Entity> {
        self.state.borrow().entities.iter().copied().collect()
    }

    /// Returns `true` if `entity` matched at the last flush.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.state.borrow().entities.contains(&entity)
    }

    /// Number of matching entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().entities.len()
    }

    /// Returns `true` if no entity matched at the last flush.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entities.is_empty()
    }

    /// Component types an entity must have.
    #[must_use]
    pub fn includes(&self) -> Vec<ComponentType> {
        self.state.borrow().include.clone()
    }

    /// Component types an entity must not have.
    #[must_use]
    pub fn excludes(&self) -> Vec<ComponentType> {
        self.state.borrow().exclude.clone()
    }

    /// Insert or drop `entity` depending on the predicate. Idempotent.
    ///
    /// Dead entities never match, so a deleted entity also leaves queries
    /// with an empty include set.
    pub(crate) fn update(&self, entity: Entity, directory: &Directory) {
        let mut state = self.state.borrow_mut();
        let matches = directory.is_alive(entity)
            && state
                .include
                .iter()
                .all(|&ty| directory.has_component(entity, ty))
            && state
                .exclude
                .iter()
                .all(|&ty| !directory.has_component(entity, ty));

        if matches {
            state.entities.insert(entity);
        } else {
            state.entities.remove(&entity);
        }
    }
}

/// Fluent construction of a [`Query`] predicate.
///
/// Obtained from [`World::build_filter`](crate::World::build_filter).
#[derive(Debug)]
#[must_use = "a query is only registered once `build` is called"]
pub struct QueryBuilder<'w> {
    directory: &'w SharedDirectory,
    include: Vec<ComponentType>,
    exclude: Vec<ComponentType>,
}

impl<'w> QueryBuilder<'w> {
    pub(crate) fn new(directory: &'w SharedDirectory) -> Self {
        Self {
            directory,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Require entities to have a `T`.
    pub fn include<T: Component>(mut self) -> Self {
        self.include.push(ComponentType::of::<T>());
        self
    }

    /// Require entities not to have a `T`.
    pub fn exclude<T: Component>(mut self) -> Self {
        self.exclude.push(ComponentType::of::<T>());
        self
    }

    /// Register the query with the world and evaluate it against the
    /// entities that are currently dirty.
    ///
    /// Entities that already exist but are not dirty are not scanned; they
    /// enter the result set the next time they are touched.
    pub fn build(self) -> Query {
        debug!(
            include = ?self.include.iter().map(ComponentType::name).collect::<Vec<_>>(),
            exclude = ?self.exclude.iter().map(ComponentType::name).collect::<Vec<_>>(),
            "registering query"
        );
        let query = Query::new(self.include, self.exclude);
        self.directory.borrow_mut().register(query.clone());
        query
    }
}
