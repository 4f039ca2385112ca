//! # fanflow - ceiling fan airflow particles
//!
//! A heuristic particle simulation of the air in a room with a ceiling fan.
//! Each particle carries a temperature and is pushed around by a hand-tuned
//! field: a downdraft (or updraft) column under the fan, floor and ceiling
//! spread, wall channels, flow over benches, drift toward an open window or
//! door, buoyancy and drag. It is a visualization model, not a fluid solver.
//!
//! ## Quick Start
//!
//! ```
//! use fanflow::prelude::*;
//!
//! let mut sim = Simulation::builder()
//!     .with_particle_count(1_000)
//!     .with_seed(42)
//!     .build()
//!     .unwrap();
//!
//! sim.environment_mut().set_powered(true);
//! sim.environment_mut().set_speed(4.0);
//!
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0);
//! }
//!
//! let mut instances = Vec::new();
//! sim.field().write_instances(&mut instances);
//! assert_eq!(instances.len(), 1_000);
//! ```
//!
//! ## Core Concepts
//!
//! ### The step
//!
//! [`Simulation::step`] makes one pass over every particle. For each one,
//! independently:
//!
//! 1. [`thermal`] relaxes the temperature toward a height profile and applies
//!    fan cooling, floor cooling, ceiling heating and the openings.
//! 2. [`airflow`] updates the velocity: drag, jitter, buoyancy, the active
//!    [`FanZone`], then window and door drift.
//! 3. The position integrates the velocity.
//! 4. [`collision`] pushes the particle off benches and back inside the room.
//! 5. [`rescue`] kicks particles that have stalled.
//! 6. [`visuals`] refreshes the render color from the temperature.
//!
//! No particle reads another, so with the default `parallel` feature the pass
//! runs on rayon. Randomness is seeded per particle and per frame, so the
//! result is the same either way.
//!
//! ### Environment
//!
//! [`EnvironmentState`] is the control surface: power, speed, direction and
//! the two openings. Change it between steps; a step treats it as read-only.
//!
//! ### Rendering
//!
//! Read [`ParticleField::positions`], [`colors`](ParticleField::colors) and
//! [`sizes`](ParticleField::sizes), or pack a [`ParticleInstance`] buffer
//! with [`ParticleField::write_instances`]. [`FanRotor`] and [`DoorLeaf`]
//! carry the blade angle and door position for drawing the fixtures.
//!
//! ## Feature Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`room`] | [`RoomGeometry`], [`Obstacle`], [`ObstacleSet`] |
//! | [`environment`] | [`EnvironmentState`], [`FanDirection`], [`FanMode`] |
//! | [`airflow`] | [`Surroundings`], [`FanZone`], velocity update |
//! | [`config`] | [`SimulationConfig`] JSON load / save |
//! | [`diagnostics`] | [`FieldStats`], [`ZoneCensus`] |
//! | [`random`] | [`RandomSource`] and deterministic test sources |
//! | [`time`] | [`Time`] frame clock with a stall guard |

pub mod airflow;
pub mod collision;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod fixtures;
pub mod particle;
pub mod random;
pub mod rescue;
pub mod room;
mod simulation;
mod spawn;
pub mod thermal;
pub mod time;
pub mod visuals;

pub use airflow::{FanZone, Surroundings};
pub use bytemuck;
pub use config::SimulationConfig;
pub use diagnostics::{FieldStats, ZoneCensus};
pub use environment::{EnvironmentState, FanDirection, FanMode};
pub use error::{ConfigError, Result};
pub use fixtures::{DoorLeaf, FanRotor};
pub use glam::{Vec2, Vec3};
pub use particle::{Particle, ParticleField, ParticleInstance};
pub use random::RandomSource;
pub use room::{Obstacle, ObstacleSet, RoomGeometry};
pub use simulation::{step_particle, Simulation, SimulationBuilder, DEFAULT_MAX_DELTA};
pub use spawn::SpawnContext;
pub use time::Time;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```
/// use fanflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SimulationConfig;
    pub use crate::diagnostics::{FieldStats, ZoneCensus};
    pub use crate::environment::{EnvironmentState, FanDirection, FanMode};
    pub use crate::error::ConfigError;
    pub use crate::fixtures::{DoorLeaf, FanRotor};
    pub use crate::particle::{Particle, ParticleField, ParticleInstance};
    pub use crate::room::{Obstacle, ObstacleSet, RoomGeometry};
    pub use crate::simulation::{Simulation, SimulationBuilder};
    pub use crate::spawn::SpawnContext;
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3};
}
