//! # ecs_component
//!
//! The identity layer of the ECS: what an entity is and how component types
//! are told apart at runtime.
//!
//! This crate provides:
//!
//! - [`Entity`]: opaque `u64` entity handles.
//! - [`EntityAllocator`]: monotonically increasing, never-recycled ID allocator.
//! - [`ComponentType`]: `{name, hash, size}` runtime type identifier.
//! - [`Component`]: marker trait for values stored in pools.

pub mod component;
pub mod entity;

pub use component::{Component, ComponentType};
pub use entity::{Entity, EntityAllocator};
