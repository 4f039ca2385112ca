//! Simulation builder and stepper

use crate::airflow::{self, Surroundings};
use crate::collision;
use crate::environment::EnvironmentState;
use crate::error::Result;
use crate::fixtures::{DoorLeaf, FanRotor};
use crate::particle::{default_spawner, Particle, ParticleField, DEFAULT_PARTICLE_COUNT};
use crate::random::{particle_rng, RandomSource};
use crate::rescue;
use crate::room::{ObstacleSet, RoomGeometry};
use crate::spawn::SpawnContext;
use crate::thermal;
use log::{debug, trace, warn};

/// Default upper bound on a single step's delta time, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Velocities are tuned per 60 Hz frame.
const FRAME_RATE: f32 = 60.0;
/// Global scale from velocity to displacement.
const VELOCITY_SCALE: f32 = 0.5;

type Spawner = Box<dyn FnMut(&mut SpawnContext) -> Particle>;

/// A simulation builder.
///
/// Use method chaining to configure, then call `.build()` to validate the
/// configuration and fill the particle field.
pub struct SimulationBuilder {
    particle_count: usize,
    seed: u64,
    max_delta: f32,
    room: RoomGeometry,
    obstacles: ObstacleSet,
    environment: EnvironmentState,
    spawner: Option<Spawner>,
}

impl SimulationBuilder {
    /// Create a builder with default settings: 10 000 particles, the default
    /// room with the classroom benches, fan off.
    pub fn new() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: 0,
            max_delta: DEFAULT_MAX_DELTA,
            room: RoomGeometry::default(),
            obstacles: ObstacleSet::classroom(),
            environment: EnvironmentState::new(),
            spawner: None,
        }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the seed for spawning and per-step randomness.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the room geometry.
    pub fn with_room(mut self, room: RoomGeometry) -> Self {
        self.room = room;
        self
    }

    /// Replace the obstacle set.
    pub fn with_obstacles(mut self, obstacles: ObstacleSet) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Set the starting environment.
    pub fn with_environment(mut self, environment: EnvironmentState) -> Self {
        self.environment = environment;
        self
    }

    /// Set the largest delta time a single step will integrate.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Set the particle spawner function.
    /// Called once per particle, in index order.
    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: FnMut(&mut SpawnContext) -> Particle + 'static,
    {
        self.spawner = Some(Box::new(spawner));
        self
    }

    /// Validate the configuration and fill the particle field.
    pub fn build(self) -> Result<Simulation> {
        self.room.validate()?;
        self.obstacles.validate(&self.room)?;

        let max_delta = if self.max_delta.is_finite() && self.max_delta > 0.0 {
            self.max_delta
        } else {
            warn!("max delta {} rejected, using {}", self.max_delta, DEFAULT_MAX_DELTA);
            DEFAULT_MAX_DELTA
        };

        let field = match self.spawner {
            Some(spawner) => ParticleField::initialize_with(self.particle_count, &self.room, self.seed, spawner)?,
            None => ParticleField::initialize_with(self.particle_count, &self.room, self.seed, default_spawner)?,
        };

        debug!(
            "built simulation: {} particles, {} obstacles, max delta {}",
            field.len(),
            self.obstacles.len(),
            max_delta
        );

        Ok(Simulation {
            field,
            env: self.environment.sanitized(),
            door: DoorLeaf::closed(&self.room),
            room: self.room,
            obstacles: self.obstacles,
            seed: self.seed,
            frame: 0,
            max_delta,
            rotor: FanRotor::new(),
        })
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running fan-room simulation.
///
/// Owns the particle field and the environment snapshot. Hosts change the
/// environment between frames through [`Simulation::environment_mut`] and
/// advance with [`Simulation::step`].
pub struct Simulation {
    field: ParticleField,
    env: EnvironmentState,
    room: RoomGeometry,
    obstacles: ObstacleSet,
    seed: u64,
    frame: u64,
    max_delta: f32,
    rotor: FanRotor,
    door: DoorLeaf,
}

impl Simulation {
    /// Start configuring a simulation.
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Clamp a host-supplied delta time into `[0, max_delta]`.
    ///
    /// Negative and NaN deltas become 0.
    pub fn sanitize_delta(&self, dt: f32) -> f32 {
        if dt.is_nan() || dt < 0.0 {
            warn!("delta time {} replaced with 0", dt);
            0.0
        } else if dt > self.max_delta {
            warn!("delta time {} clamped to {}", dt, self.max_delta);
            self.max_delta
        } else {
            dt
        }
    }

    /// Advance every particle and fixture by one frame.
    pub fn step(&mut self, dt: f32) {
        let dt = self.sanitize_delta(dt);
        let env = self.env;
        let room = self.room;
        let obstacles = &self.obstacles;
        let seed = self.seed;
        let frame = self.frame;

        let update = |index: usize, particle: &mut Particle| {
            let mut rng = particle_rng(seed, frame, index);
            step_particle(particle, &env, &room, obstacles, dt, &mut rng)
        };

        let particles = self.field.particles_mut();

        #[cfg(feature = "parallel")]
        let rescued = {
            use rayon::prelude::*;
            particles.par_iter_mut().enumerate().map(|(i, p)| update(i, p)).filter(|&kicked| kicked).count()
        };

        #[cfg(not(feature = "parallel"))]
        let rescued = particles.iter_mut().enumerate().map(|(i, p)| update(i, p)).filter(|&kicked| kicked).count();

        self.rotor.advance(&self.env, dt);
        self.door.advance(&self.env, &self.room);

        trace!("frame {}: dt {:.4}, {} particles rescued", self.frame, dt, rescued);
        self.frame += 1;
    }

    // ========== Accessors ==========

    /// The particle field.
    #[inline]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// The current environment.
    #[inline]
    pub fn environment(&self) -> &EnvironmentState {
        &self.env
    }

    /// Mutable access to the environment. Only call between steps.
    #[inline]
    pub fn environment_mut(&mut self) -> &mut EnvironmentState {
        &mut self.env
    }

    /// Replace the environment wholesale.
    pub fn set_environment(&mut self, env: EnvironmentState) {
        debug!("environment replaced: {:?}", env);
        self.env = env.sanitized();
    }

    /// Room geometry.
    #[inline]
    pub fn room(&self) -> &RoomGeometry {
        &self.room
    }

    /// Obstacles.
    #[inline]
    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Seed used for spawning and stepping.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed steps.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Largest delta a step integrates.
    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Fan blade state.
    #[inline]
    pub fn rotor(&self) -> &FanRotor {
        &self.rotor
    }

    /// Mutable fan blade state, for pitch control.
    #[inline]
    pub fn rotor_mut(&mut self) -> &mut FanRotor {
        &mut self.rotor
    }

    /// Door panel state.
    #[inline]
    pub fn door(&self) -> &DoorLeaf {
        &self.door
    }
}

/// Run the full per-particle update with an explicit random source.
///
/// Temperature, velocity, integration, collision, rescue, then color. Reads
/// nothing but the particle itself and the shared immutable inputs. Returns
/// whether the particle needed a stagnation kick.
pub fn step_particle<R: RandomSource>(
    particle: &mut Particle,
    env: &EnvironmentState,
    room: &RoomGeometry,
    obstacles: &ObstacleSet,
    dt: f32,
    rng: &mut R,
) -> bool {
    let before = Surroundings::probe(particle.position, room, obstacles);

    particle.temperature = thermal::update_temperature(particle, env, room, dt);
    particle.velocity = airflow::update_velocity(particle.velocity, &before, env, room, rng);
    particle.position += particle.velocity * dt * FRAME_RATE * VELOCITY_SCALE;

    collision::resolve(particle, &before, env, room, obstacles, rng);
    let kicked = rescue::rescue(particle, &before, room, rng);

    particle.refresh_color();
    kicked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::FanDirection;
    use crate::error::ConfigError;
    use crate::random::FixedSource;
    use crate::visuals::thermal_color;
    use glam::Vec3;

    fn small() -> Simulation {
        Simulation::builder().with_particle_count(200).with_seed(9).build().unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let sim = Simulation::builder().build().unwrap();
        assert_eq!(sim.field().len(), DEFAULT_PARTICLE_COUNT);
        assert_eq!(sim.obstacles().len(), 4);
        assert_eq!(sim.max_delta(), DEFAULT_MAX_DELTA);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn test_zero_particles_rejected() {
        let result = Simulation::builder().with_particle_count(0).build();
        assert!(matches!(result, Err(ConfigError::ZeroParticleCount)));
    }

    #[test]
    fn test_bad_room_rejected() {
        let mut room = RoomGeometry::default();
        room.ceiling_y = room.floor_y;
        let result = Simulation::builder().with_room(room).build();
        assert!(matches!(result, Err(ConfigError::InvalidGeometry(_))));
    }

    #[test]
    fn test_sanitize_delta() {
        let sim = small();
        assert_eq!(sim.sanitize_delta(-1.0), 0.0);
        assert_eq!(sim.sanitize_delta(f32::NAN), 0.0);
        assert_eq!(sim.sanitize_delta(5.0), DEFAULT_MAX_DELTA);
        assert_eq!(sim.sanitize_delta(f32::INFINITY), DEFAULT_MAX_DELTA);
        assert_eq!(sim.sanitize_delta(0.016), 0.016);
    }

    #[test]
    fn test_invalid_max_delta_falls_back() {
        let sim = Simulation::builder()
            .with_particle_count(10)
            .with_max_delta(-3.0)
            .build()
            .unwrap();
        assert_eq!(sim.max_delta(), DEFAULT_MAX_DELTA);
    }

    #[test]
    fn test_step_advances_frame_and_keeps_count() {
        let mut sim = small();
        for _ in 0..5 {
            sim.step(1.0 / 60.0);
        }
        assert_eq!(sim.frame(), 5);
        assert_eq!(sim.field().len(), 200);
    }

    #[test]
    fn test_step_refreshes_color() {
        let mut sim = small();
        sim.step(1.0 / 60.0);
        for p in sim.field().particles() {
            assert_eq!(p.color(), thermal_color(p.temperature));
        }
    }

    #[test]
    fn test_custom_spawner() {
        let sim = Simulation::builder()
            .with_particle_count(16)
            .with_spawner(|ctx| Particle::new(Vec3::new(0.0, ctx.progress(), 0.0), 0.5, 0.03))
            .build()
            .unwrap();
        assert_eq!(sim.field().particles()[0].position, Vec3::ZERO);
        assert_eq!(sim.field().particles()[8].position.y, 0.5);
    }

    #[test]
    fn test_spawner_outside_room_rejected() {
        let result = Simulation::builder()
            .with_particle_count(2)
            .with_spawner(|_| {
                let mut p = Particle::new(Vec3::new(50.0, 40.0, 0.0), 0.5, 0.03);
                p.temperature = 7.5;
                p
            })
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidParticle { index: 0, .. })));
    }

    #[test]
    fn test_fixtures_follow_environment() {
        let mut sim = small();
        sim.environment_mut().set_powered(true);
        sim.environment_mut().set_speed(3.0);
        sim.environment_mut().set_door_open(true);
        let door_before = sim.door().x();
        sim.step(0.05);
        assert!(sim.rotor().angle() > 0.0);
        assert!(sim.door().x() > door_before);
    }

    #[test]
    fn test_step_particle_integrates() {
        let room = RoomGeometry::default();
        let obstacles = ObstacleSet::new();
        let env = EnvironmentState::new();
        let mut p = Particle::new(Vec3::ZERO, 0.6, 0.03);
        p.velocity = Vec3::new(0.1, 0.0, 0.0);
        // 0.5 makes the jitter vanish.
        let kicked = step_particle(&mut p, &env, &room, &obstacles, 1.0 / 60.0, &mut FixedSource(0.5));
        assert!(!kicked);
        // drag 0.97, then scaled by dt * 60 * 0.5
        assert!((p.position.x - 0.097 * 0.5).abs() < 1e-6);
        // mid-height: no buoyancy, nothing else acts with the fan off
        assert_eq!(p.position.y, 0.0);
    }

    #[test]
    fn test_zero_dt_holds_position_of_moving_particle() {
        let room = RoomGeometry::default();
        let obstacles = ObstacleSet::classroom();
        let env = EnvironmentState::running(5.0, FanDirection::Forward);
        let mut p = Particle::new(Vec3::new(1.0, 0.0, 1.0), 0.5, 0.03);
        p.velocity = Vec3::new(0.05, -0.05, 0.0);
        step_particle(&mut p, &env, &room, &obstacles, 0.0, &mut FixedSource(0.5));
        assert_eq!(p.position, Vec3::new(1.0, 0.0, 1.0));
    }
}
