//! Events the host delivers to the event phase.

use serde::{Deserialize, Serialize};

/// An external event, delivered to every enabled event system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    /// Flip the enabled state of the named system.
    ToggleSystem(String),
    /// Stop the tick loop after the current tick.
    Quit,
}

/// A host event scheduled for a given tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    /// Tick the event is delivered on, counting from 1.
    pub tick: u64,
    pub event: HostEvent,
}
