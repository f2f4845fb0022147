use anyhow::Result;
use ecs_system::{EventSystem, System, SystemStatus};
use ecs_world::World;
use tracing::{info, warn};

use crate::event::HostEvent;

/// Applies [`HostEvent::ToggleSystem`] to the shared status map.
pub struct ControlSystem {
    status: SystemStatus,
}

impl ControlSystem {
    pub const NAME: &'static str = "control";

    #[must_use]
    pub fn new(status: SystemStatus) -> Self {
        Self { status }
    }
}

impl EventSystem<HostEvent> for ControlSystem {
    fn event(&mut self, _world: &mut World, event: &HostEvent) -> Result<()> {
        if let HostEvent::ToggleSystem(name) = event {
            if self.status.toggle(name) {
                info!(system = %name, enabled = self.status.is_enabled(name), "system toggled");
            } else {
                warn!(system = %name, "toggle for unknown system ignored");
            }
        }
        Ok(())
    }
}

impl System<HostEvent> for ControlSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn as_event(&mut self) -> Option<&mut dyn EventSystem<HostEvent>> {
        Some(self)
    }
}
