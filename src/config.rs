//! Serializable simulation configuration.
//!
//! A [`SimulationConfig`] captures everything needed to rebuild a simulation
//! from scratch. Missing keys take their default, so a file holding only
//! `{"particle_count": 500}` is valid.

use crate::environment::EnvironmentState;
use crate::error::Result;
use crate::particle::DEFAULT_PARTICLE_COUNT;
use crate::room::{ObstacleSet, RoomGeometry};
use crate::simulation::{Simulation, DEFAULT_MAX_DELTA};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of particles, fixed for the session.
    pub particle_count: usize,
    /// Seed for spawning and per-step randomness.
    pub seed: u64,
    /// Largest delta time a single step integrates.
    pub max_delta: f32,
    /// Room dimensions.
    pub room: RoomGeometry,
    /// Named obstacles.
    pub obstacles: ObstacleSet,
    /// Starting fan and opening state.
    pub environment: EnvironmentState,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: 0,
            max_delta: DEFAULT_MAX_DELTA,
            room: RoomGeometry::default(),
            obstacles: ObstacleSet::classroom(),
            environment: EnvironmentState::new(),
        }
    }
}

impl SimulationConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        debug!("saved config to {}", path.as_ref().display());
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        debug!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Check the geometry and obstacles without building anything.
    pub fn validate(&self) -> Result<()> {
        self.room.validate()?;
        self.obstacles.validate(&self.room)
    }

    /// Validate and build a simulation from this configuration.
    pub fn into_simulation(self) -> Result<Simulation> {
        self.validate()?;
        Simulation::builder()
            .with_particle_count(self.particle_count)
            .with_seed(self.seed)
            .with_max_delta(self.max_delta)
            .with_room(self.room)
            .with_obstacles(self.obstacles)
            .with_environment(self.environment)
            .build()
    }
}
