//! World-layer error types.

use ecs_component::{ComponentType, Entity};

/// Errors raised by pool and world operations.
///
/// These indicate bugs in system logic rather than runtime conditions, so
/// nothing in the world retries or recovers from them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity already owns a component of this type.
    #[error("{entity} already has component '{component}'")]
    DuplicateComponent {
        entity: Entity,
        component: ComponentType,
    },

    /// The entity does not own a component of this type.
    #[error("{entity} has no component '{component}'")]
    MissingComponent {
        entity: Entity,
        component: ComponentType,
    },

    /// The entity was removed by an earlier flush, or never existed.
    #[error("cannot add component '{component}' to {entity}, which is not alive")]
    DeadEntity {
        entity: Entity,
        component: ComponentType,
    },

    /// A `get`/`get_mut` guard on this pool is still held.
    #[error("pool '{component}' is borrowed by an outstanding guard")]
    PoolBorrowed { component: ComponentType },

    /// Two distinct Rust types resolved to the same component type identifier.
    #[error("component type '{component}' is already bound to a different Rust type")]
    TypeConflict { component: ComponentType },
}
