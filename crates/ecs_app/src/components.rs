//! Components of the asteroid field simulation.
//!
//! Angles are in degrees and times in seconds.

use ecs_world::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position, heading and uniform scale in the arena plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Heading in degrees, kept in `[0, 360)`.
    pub rotation: f32,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: 1.0,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform {}

/// Linear velocity in units per second.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    pub value: Vec2,
}

impl Component for Velocity {}

/// Angular velocity in degrees per second.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RotationVelocity {
    pub value: f32,
}

impl Component for RotationVelocity {}

/// Remaining lifetime. The entity is deleted once `current` reaches zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Lifespan {
    pub total: f32,
    pub current: f32,
}

impl Lifespan {
    #[must_use]
    pub fn new(total: f32) -> Self {
        Self {
            total,
            current: total,
        }
    }
}

impl Component for Lifespan {}

/// Countdown that blocks an action while present. Removed when it expires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Cooldown {
    pub total: f32,
    pub current: f32,
}

impl Cooldown {
    #[must_use]
    pub fn new(total: f32) -> Self {
        Self {
            total,
            current: total,
        }
    }
}

impl Component for Cooldown {}

/// Marks an asteroid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AsteroidTag;

impl Component for AsteroidTag {}

/// Marks the entity whose cooldown paces asteroid spawning.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AsteroidSpawnerTag;

impl Component for AsteroidSpawnerTag {}
