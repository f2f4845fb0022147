//! Simulation settings, loaded from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::event::ScriptedEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for every random draw the simulation makes.
    pub seed: u64,
    pub arena: ArenaConfig,
    pub gameplay: GameplayConfig,
    pub asteroid: AsteroidConfig,
    /// Renders between two population reports.
    pub stats_interval: u64,
    /// Host events to inject at fixed ticks.
    pub script: Vec<ScriptedEvent>,
}

/// Size of the playing field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Seconds between two spawn attempts.
    pub spawn_cooldown: f32,
    pub spawn_max_alive: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    /// Speed of the lightest asteroid, in units per second.
    pub base_speed: f32,
    pub mass_min: f32,
    pub mass_max: f32,
    /// Degrees per second.
    pub rotation_speed_min: f32,
    pub rotation_speed_max: f32,
    /// Seconds.
    pub lifespan_min: f32,
    pub lifespan_max: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            arena: ArenaConfig::default(),
            gameplay: GameplayConfig::default(),
            asteroid: AsteroidConfig::default(),
            stats_interval: 60,
            script: Vec::new(),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            spawn_cooldown: 0.5,
            spawn_max_alive: 12,
        }
    }
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            base_speed: 120.0,
            mass_min: 5.0,
            mass_max: 12.0,
            rotation_speed_min: -90.0,
            rotation_speed_max: 90.0,
            lifespan_min: 4.0,
            lifespan_max: 10.0,
        }
    }
}

impl GameConfig {
    /// Read and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this structure, or fails [`GameConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot work with.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.arena.width > 0.0 && self.arena.height > 0.0,
            "arena must have a positive size"
        );
        ensure!(
            self.gameplay.spawn_cooldown > 0.0,
            "gameplay.spawn_cooldown must be positive"
        );
        let a = &self.asteroid;
        ensure!(a.base_speed >= 0.0, "asteroid.base_speed must not be negative");
        ensure!(
            0.0 < a.mass_min && a.mass_min <= a.mass_max,
            "asteroid mass range is empty"
        );
        ensure!(
            a.rotation_speed_min <= a.rotation_speed_max,
            "asteroid rotation speed range is empty"
        );
        ensure!(
            0.0 < a.lifespan_min && a.lifespan_min <= a.lifespan_max,
            "asteroid lifespan range is empty"
        );
        ensure!(self.stats_interval > 0, "stats_interval must be positive");
        Ok(())
    }
}
