//! Typed, entity-indexed component storage.
//!
//! A [`Pool<T>`] stores every `T` in the world, keyed by [`Entity`]. Each add
//! and delete is reported to the directory, which keeps the entity's type set
//! current and marks it for re-evaluation at the next flush.
//!
//! The world keeps every pool behind the narrow [`ErasedPool`] interface
//! (`has`, `del`), which is all the deletion pass needs. The typed `add`/`get`
//! surface is only reachable through the [`Pool<T>`] handle.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;

use ecs_component::{Component, ComponentType, Entity};

use crate::directory::{SharedDirectory, WorldEvent};
use crate::error::EcsError;

/// Handle to the storage for one component type.
///
/// Handles are cheap to clone and all clones share the same storage. Systems
/// usually fetch one during init and keep it.
///
/// `get`/`get_mut` return cell guards. While one is held, `add`, `del` and
/// conflicting `get`/`get_mut` calls on the same pool fail with
/// [`EcsError::PoolBorrowed`].
pub struct Pool<T: Component> {
    ty: ComponentType,
    components: Rc<RefCell<BTreeMap<Entity, T>>>,
    directory: SharedDirectory,
}

impl<T: Component> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty,
            components: Rc::clone(&self.components),
            directory: Rc::clone(&self.directory),
        }
    }
}

impl<T: Component> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("type", &self.ty.name())
            .field("len", &self.len())
            .finish()
    }
}

impl<T: Component> Pool<T> {
    pub(crate) fn new(directory: SharedDirectory) -> Self {
        Self {
            ty: ComponentType::of::<T>(),
            components: Rc::new(RefCell::new(BTreeMap::new())),
            directory,
        }
    }

    /// The component type stored in this pool.
    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        self.ty
    }

    /// Returns `true` if `entity` currently owns a `T`.
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.components.borrow().contains_key(&entity)
    }

    /// Attach `value` to `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateComponent`] if the entity already has a `T`.
    /// - [`EcsError::DeadEntity`] if a flush already removed the entity.
    /// - [`EcsError::PoolBorrowed`] while a guard on this pool is held.
    pub fn add(&self, entity: Entity, value: T) -> Result<(), EcsError> {
        if !self.directory.borrow().is_alive(entity) {
            return Err(EcsError::DeadEntity {
                entity,
                component: self.ty,
            });
        }
        {
            let mut components = self.storage_mut()?;
            if components.contains_key(&entity) {
                return Err(EcsError::DuplicateComponent {
                    entity,
                    component: self.ty,
                });
            }
            components.insert(entity, value);
        }
        self.directory
            .borrow_mut()
            .notify(WorldEvent::ComponentAdded(entity, self.ty));
        Ok(())
    }

    /// Attach `T::default()` to `entity`.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub fn add_default(&self, entity: Entity) -> Result<(), EcsError>
    where
        T: Default,
    {
        self.add(entity, T::default())
    }

    /// Borrow the `T` owned by `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn get(&self, entity: Entity) -> Result<Ref<'_, T>, EcsError> {
        Ref::filter_map(self.storage()?, |c| c.get(&entity))
            .map_err(|_| self.missing(entity))
    }

    /// Mutably borrow the `T` owned by `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn get_mut(&self, entity: Entity) -> Result<RefMut<'_, T>, EcsError> {
        RefMut::filter_map(self.storage_mut()?, |c| c.get_mut(&entity))
            .map_err(|_| self.missing(entity))
    }

    /// Detach and drop the `T` owned by `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn del(&self, entity: Entity) -> Result<(), EcsError> {
        if self.storage_mut()?.remove(&entity).is_none() {
            return Err(self.missing(entity));
        }
        self.directory
            .borrow_mut()
            .notify(WorldEvent::ComponentRemoved(entity, self.ty));
        Ok(())
    }

    /// Number of entities owning a `T`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.borrow().len()
    }

    /// Returns `true` if no entity owns a `T`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.borrow().is_empty()
    }

    /// Owners of a `T`, in id order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.components.borrow().keys().copied().collect()
    }

    fn storage(&self) -> Result<Ref<'_, BTreeMap<Entity, T>>, EcsError> {
        self.components.try_borrow().map_err(|_| self.borrowed())
    }

    fn storage_mut(&self) -> Result<RefMut<'_, BTreeMap<Entity, T>>, EcsError> {
        self.components.try_borrow_mut().map_err(|_| self.borrowed())
    }

    fn borrowed(&self) -> EcsError {
        EcsError::PoolBorrowed { component: self.ty }
    }

    fn missing(&self, entity: Entity) -> EcsError {
        EcsError::MissingComponent {
            entity,
            component: self.ty,
        }
    }
}

/// The type-erased slice of a pool the world needs during a flush.
pub(crate) trait ErasedPool {
    fn has(&self, entity: Entity) -> bool;
    fn del(&self, entity: Entity) -> Result<(), EcsError>;
    fn as_any(&self) -> &dyn Any;
}

impl dyn ErasedPool {
    /// Recover the typed handle this erased pool was created from.
    pub(crate) fn downcast<T: Component>(&self) -> Option<&Pool<T>> {
        self.as_any().downcast_ref()
    }
}

impl<T: Component> ErasedPool for Pool<T> {
    fn has(&self, entity: Entity) -> bool {
        Pool::has(self, entity)
    }

    fn del(&self, entity: Entity) -> Result<(), EcsError> {
        Pool::del(self, entity)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Health {
        current: f32,
    }

    impl Component for Health {}

    fn make_pool() -> (SharedDirectory, Pool<Health>, Entity) {
        let directory = Directory::shared();
        let entity = directory.borrow_mut().allocate();
        let pool = Pool::<Health>::new(Rc::clone(&directory));
        (directory, pool, entity)
    }

    #[test]
    fn test_add_and_get() {
        let (_dir, pool, e) = make_pool();
        assert!(!pool.has(e));
        pool.add(e, Health { current: 5.0 }).unwrap();
        assert!(pool.has(e));
        assert_eq!(pool.get(e).unwrap().current, 5.0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_add_default() {
        let (_dir, pool, e) = make_pool();
        pool.add_default(e).unwrap();
        assert_eq!(*pool.get(e).unwrap(), Health::default());
    }

    #[test]
    fn test_add_twice_is_duplicate() {
        let (_dir, pool, e) = make_pool();
        pool.add_default(e).unwrap();
        let err = pool.add(e, Health { current: 1.0 }).unwrap_err();
        assert_eq!(
            err,
            EcsError::DuplicateComponent {
                entity: e,
                component: ComponentType::of::<Health>(),
            }
        );
        // The original value is untouched.
        assert_eq!(pool.get(e).unwrap().current, 0.0);
    }

    #[test]
    fn test_get_and_del_missing() {
        let (_dir, pool, e) = make_pool();
        assert!(matches!(
            pool.get(e),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(matches!(
            pool.get_mut(e),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(matches!(pool.del(e), Err(EcsError::MissingComponent { .. })));
    }

    #[test]
    fn test_get_mut_writes_through() {
        let (_dir, pool, e) = make_pool();
        pool.add_default(e).unwrap();
        pool.get_mut(e).unwrap().current = 9.0;
        assert_eq!(pool.get(e).unwrap().current, 9.0);
    }

    #[test]
    fn test_add_and_del_notify_directory() {
        let (dir, pool, e) = make_pool();
        let ty = ComponentType::of::<Health>();
        dir.borrow_mut().reevaluate();

        pool.add_default(e).unwrap();
        assert!(dir.borrow().has_component(e, ty));
        assert_eq!(dir.borrow().pending_reevaluations(), 1);

        dir.borrow_mut().reevaluate();
        pool.del(e).unwrap();
        assert!(!dir.borrow().has_component(e, ty));
        assert_eq!(dir.borrow().pending_reevaluations(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let (_dir, pool, e) = make_pool();
        let other = pool.clone();
        pool.add_default(e).unwrap();
        assert!(other.has(e));
        assert_eq!(other.entities(), vec![e]);
    }

    #[test]
    fn test_held_guard_blocks_mutation() {
        let (dir, pool, a) = make_pool();
        let b = dir.borrow_mut().allocate();
        pool.add_default(a).unwrap();
        pool.add_default(b).unwrap();
        let borrowed = EcsError::PoolBorrowed {
            component: ComponentType::of::<Health>(),
        };

        {
            let health = pool.get(a).unwrap();
            assert_eq!(pool.del(b), Err(borrowed.clone()));
            assert_eq!(pool.get(b).unwrap().current, health.current);
            assert!(matches!(pool.get_mut(b), Err(EcsError::PoolBorrowed { .. })));
        }
        {
            let _health = pool.get_mut(a).unwrap();
            assert!(matches!(pool.get(b), Err(EcsError::PoolBorrowed { .. })));
        }

        pool.del(b).unwrap();
        assert!(!pool.has(b));
        assert!(dir.borrow().is_alive(b));
    }

    #[test]
    fn test_add_to_unknown_entity_is_dead() {
        let (_dir, pool, _) = make_pool();
        assert_eq!(
            pool.add_default(Entity(99)),
            Err(EcsError::DeadEntity {
                entity: Entity(99),
                component: ComponentType::of::<Health>(),
            })
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn test_erased_pool_roundtrip() {
        let (_dir, pool, e) = make_pool();
        pool.add_default(e).unwrap();

        let erased: Box<dyn ErasedPool> = Box::new(pool.clone());
        assert!(erased.has(e));
        assert!(erased.downcast::<Health>().is_some());

        erased.del(e).unwrap();
        assert!(!pool.has(e));
    }
}
