//! Entity ids.
//!
//! Each world owns one [`EntityAllocator`]. Ids start at 1, grow with every
//! allocation and are never handed out twice, so a stale [`Entity`] can never
//! alias a newer one.

use std::fmt;

/// Identity of one entity. It carries no data of its own; pools attach
/// components to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub u64);

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity #{}", self.0)
    }
}

/// Source of fresh entity ids for one world.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    last: u64,
}

impl EntityAllocator {
    pub fn allocate(&mut self) -> Entity {
        self.last += 1;
        Entity(self.last)
    }
}
