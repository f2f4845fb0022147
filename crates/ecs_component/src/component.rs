//! Core [`Component`] trait and runtime component type identity.
//!
//! A [`ComponentType`] names a component's Rust type at runtime by
//! `{name, hash, size}`. The hash is FNV-1a 64 over the UTF-8 name, so it is
//! deterministic across runs and cheap to compute in a `const` context.

use std::cmp::Ordering;

/// Runtime identifier of a component type.
///
/// Two `ComponentType`s are equal only when name, hash and size all match.
/// Ordering is by hash first, which is what the world's keyed tables sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    name: &'static str,
    hash: u64,
    size: usize,
}

impl ComponentType {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Build a type identifier from a name and an instance size.
    #[must_use]
    pub const fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            hash: Self::hash_name(name),
            size,
        }
    }

    /// The [`ComponentType`] of a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::new(T::type_name(), std::mem::size_of::<T>())
    }

    /// FNV-1a 64-bit hash of a type name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn hash_name(name: &str) -> u64 {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        hash
    }

    /// The component's type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The FNV-1a hash of [`ComponentType::name`].
    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    /// Size of one instance in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

impl Ord for ComponentType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash
            .cmp(&other.hash)
            .then_with(|| self.name.cmp(other.name))
            .then_with(|| self.size.cmp(&other.size))
    }
}

impl PartialOrd for ComponentType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// The core component trait.
///
/// Any `'static` value type can be a component. Implementations usually rely
/// on the default [`Component::type_name`], which is the Rust type path.
///
/// # Examples
///
/// ```rust
/// use ecs_component::{Component, ComponentType};
///
/// #[derive(Debug, Default)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {}
///
/// assert_eq!(Health::component_type(), ComponentType::of::<Health>());
/// ```
pub trait Component: 'static {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// Returns the [`ComponentType`] for this component.
    fn component_type() -> ComponentType
    where
        Self: Sized,
    {
        ComponentType::of::<Self>()
    }
}
