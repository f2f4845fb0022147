//! Shared enable/disable map keyed by system name.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Name → enabled map shared by the scheduler and anyone holding a clone.
///
/// Toggling a name takes effect the next time a phase containing that system
/// runs. Names the scheduler never registered are reported as disabled and
/// cannot be toggled.
#[derive(Debug, Clone, Default)]
pub struct SystemStatus {
    entries: Rc<RefCell<BTreeMap<String, bool>>>,
}

impl SystemStatus {
    /// Create an empty status map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as enabled. Re-registering a known name keeps its state.
    pub(crate) fn register(&self, name: &str) {
        self.entries
            .borrow_mut()
            .entry(name.to_owned())
            .or_insert(true);
    }

    /// Returns `true` if `name` is registered and enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.borrow().get(name).copied().unwrap_or(false)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    /// Set the state of `name`. Returns `false` if the name is unknown.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.entries.borrow_mut().get_mut(name) {
            Some(state) => {
                *state = enabled;
                true
            }
            None => false,
        }
    }

    /// Flip the state of `name`. Returns `false` if the name is unknown.
    pub fn toggle(&self, name: &str) -> bool {
        match self.entries.borrow_mut().get_mut(name) {
            Some(state) => {
                *state = !*state;
                true
            }
            None => false,
        }
    }

    /// Every registered name with its state, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, bool)> {
        self.entries
            .borrow()
            .iter()
            .map(|(name, &enabled)| (name.clone(), enabled))
            .collect()
    }
}
