//! Particle records and the fixed-size particle field.
//!
//! The field is allocated once and never grows or shrinks; each step mutates
//! every particle in place. Renderers read positions, colors and sizes after
//! the step returns, either through the iterators or as a packed
//! [`ParticleInstance`] buffer ready for upload.

use crate::diagnostics::BOUNDS_EPSILON;
use crate::error::{ConfigError, Result};
use crate::room::RoomGeometry;
use crate::spawn::SpawnContext;
use crate::visuals::thermal_color;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::debug;

/// Default number of particles.
pub const DEFAULT_PARTICLE_COUNT: usize = 10_000;

/// One air parcel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in room coordinates.
    pub position: Vec3,
    /// Velocity in simulation units per frame.
    pub velocity: Vec3,
    /// Normalized temperature, always in `[0, 1]`.
    pub temperature: f32,
    /// Render size, fixed at creation.
    pub size: f32,
    /// Render color, refreshed from temperature every step.
    color: Vec3,
}

impl Particle {
    /// A motionless particle at `position`.
    pub fn new(position: Vec3, temperature: f32, size: f32) -> Self {
        let temperature = temperature.clamp(0.0, 1.0);
        Self {
            position,
            velocity: Vec3::ZERO,
            temperature,
            size,
            color: thermal_color(temperature),
        }
    }

    /// Render color derived from the temperature at the last refresh.
    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Recompute the color from the current temperature.
    #[inline]
    pub(crate) fn refresh_color(&mut self) {
        self.color = thermal_color(self.temperature);
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.temperature.is_finite()
            && self.size.is_finite()
    }
}

/// GPU-friendly per-particle render record.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// World position.
    pub position: [f32; 3],
    /// Linear RGB.
    pub color: [f32; 3],
    /// Point size.
    pub size: f32,
}

impl From<&Particle> for ParticleInstance {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            color: p.color.to_array(),
            size: p.size,
        }
    }
}

/// Default spawn: uniform in the room interior, warmer higher up, at rest.
pub fn default_spawner(ctx: &mut SpawnContext) -> Particle {
    let position = ctx.random_in_room();
    let height_ratio = ctx.room.height_ratio(position.y);
    let temperature = 0.3 + 0.4 * height_ratio;
    let size = ctx.random_size();
    Particle::new(position, temperature, size)
}

/// Ordered, fixed-size collection of particles.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Fill a field of `count` particles with the default spawner.
    pub fn initialize(count: usize, room: &RoomGeometry, seed: u64) -> Result<Self> {
        Self::initialize_with(count, room, seed, default_spawner)
    }

    /// Fill a field of `count` particles with a custom spawner.
    ///
    /// The spawner is called once per particle, in index order.
    pub fn initialize_with<F>(count: usize, room: &RoomGeometry, seed: u64, mut spawner: F) -> Result<Self>
    where
        F: FnMut(&mut SpawnContext) -> Particle,
    {
        if count == 0 {
            return Err(ConfigError::ZeroParticleCount);
        }
        room.validate()?;

        let mut particles: Vec<Particle> = (0..count)
            .map(|i| {
                let mut ctx = SpawnContext::new(i, count, room, seed);
                spawner(&mut ctx)
            })
            .collect();

        check_particles(&mut particles, room)?;
        debug!("initialized {} particles with seed {}", count, seed);
        Ok(Self { particles })
    }

    /// Wrap an existing particle list.
    ///
    /// The particles are held to the same rules as spawned ones and must
    /// lie inside `room`.
    pub fn from_particles(mut particles: Vec<Particle>, room: &RoomGeometry) -> Result<Self> {
        if particles.is_empty() {
            return Err(ConfigError::ZeroParticleCount);
        }
        room.validate()?;
        check_particles(&mut particles, room)?;
        Ok(Self { particles })
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Always false; a field holds at least one particle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Read-only view of all particles.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable view for the stepper. The length cannot change.
    #[inline]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Particle positions in index order.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// Particle colors in index order.
    pub fn colors(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(Particle::color)
    }

    /// Particle sizes in index order.
    pub fn sizes(&self) -> impl Iterator<Item = f32> + '_ {
        self.particles.iter().map(|p| p.size)
    }

    /// Refill `out` with one render record per particle.
    ///
    /// Use `bytemuck::cast_slice(&out)` for the raw bytes.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.particles.iter().map(ParticleInstance::from));
    }
}

/// Reject particles a step could not recover from, then sync colors.
fn check_particles(particles: &mut [Particle], room: &RoomGeometry) -> Result<()> {
    for (index, p) in particles.iter_mut().enumerate() {
        let reason = if !p.is_finite() {
            Some("non-finite component".to_string())
        } else if !(0.0..=1.0).contains(&p.temperature) {
            Some(format!("temperature {} outside [0, 1]", p.temperature))
        } else if p.size <= 0.0 {
            Some(format!("size {} must be positive", p.size))
        } else if !room.contains(p.position, BOUNDS_EPSILON) {
            Some(format!("position {} outside the room", p.position))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ConfigError::InvalidParticle { index, reason });
        }
        p.refresh_color();
    }
    Ok(())
}
