//! Per-particle velocity update.
//!
//! Applied once per particle per step, in this order:
//!
//! 1. **Drag** - `v *= 0.97 - 0.001 * speed` (fan on) or `v *= 0.97`
//! 2. **Ambient jitter** - uniform noise per axis
//! 3. **Buoyancy** - weak lift that fades with height, damped at contact
//! 4. **Fan zone** - at most one [`FanZone`] force, see [`zones`]
//! 5. **Openings** - drift toward an open window (-x) or door (+x)
//!
//! All terms read the [`Surroundings`] probed from the particle's position
//! before it moves.

pub mod zones;

use crate::environment::EnvironmentState;
use crate::random::RandomSource;
use crate::room::{ObstacleSet, RoomGeometry};
use glam::Vec3;

pub use zones::FanZone;

/// Peak buoyant lift per step at floor level.
pub const BUOYANCY: f32 = 0.0002;
/// Height above the floor where buoyancy fades out.
const BUOYANCY_FADE_HEIGHT: f32 = 3.0;
/// Buoyancy multiplier while touching the floor or a bench.
const CONTACT_DAMPING: f32 = 0.1;
/// Distance from a surface that counts as touching it.
const CONTACT_DISTANCE: f32 = 0.15;
/// Peak drift per step toward an open window or door.
pub const OPENING_DRAFT: f32 = 0.04;

/// Where a particle sits relative to the bench it is closest to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchProximity {
    /// Absolute height of the bench top.
    pub surface_y: f32,
    /// Smallest `|x - cx|` over matched benches.
    pub offset_x: f32,
    /// Smallest `|z - cz|` over matched benches.
    pub offset_z: f32,
}

impl BenchProximity {
    /// Close to a bench centre line, where edge turbulence is injected.
    #[inline]
    pub fn near_centre_line(&self) -> bool {
        self.offset_x < 0.3 || self.offset_z < 0.3
    }
}

/// Everything the models need to know about a particle's location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surroundings {
    /// Position the probe was taken at.
    pub position: Vec3,
    /// `x` offset from the fan axis.
    pub dx: f32,
    /// `z` offset from the fan axis.
    pub dz: f32,
    /// Horizontal distance to the fan axis.
    pub dist: f32,
    /// Height above the floor.
    pub height_from_floor: f32,
    /// Surface height of a bench the particle is resting on (within 0.3).
    pub on_bench: Option<f32>,
    /// Bench the particle is over, from just below its top to 1 above it.
    pub near_bench: Option<BenchProximity>,
}

impl Surroundings {
    /// Probe the room at `position`.
    pub fn probe(position: Vec3, room: &RoomGeometry, obstacles: &ObstacleSet) -> Self {
        let dx = position.x - room.fan_axis.x;
        let dz = position.z - room.fan_axis.y;
        let mut on_bench = None;
        let mut near_bench: Option<BenchProximity> = None;

        for bench in obstacles.values() {
            if !bench.covers(position.x, position.z) {
                continue;
            }
            let surface_y = bench.surface_y(room);
            if (position.y - surface_y).abs() < 0.3 {
                on_bench.get_or_insert(surface_y);
            }
            if position.y > surface_y - 0.5 && position.y < surface_y + 1.0 {
                let (bx, bz) = bench.offsets(position.x, position.z);
                near_bench = Some(match near_bench {
                    Some(prev) => BenchProximity {
                        surface_y: prev.surface_y,
                        offset_x: prev.offset_x.min(bx),
                        offset_z: prev.offset_z.min(bz),
                    },
                    None => BenchProximity {
                        surface_y,
                        offset_x: bx,
                        offset_z: bz,
                    },
                });
            }
        }

        Self {
            position,
            dx,
            dz,
            dist: dx.hypot(dz),
            height_from_floor: position.y - room.floor_y,
            on_bench,
            near_bench,
        }
    }

    /// Horizontal unit vector pointing away from the fan axis, or `None`
    /// too close to the axis for a stable direction.
    #[inline]
    pub fn outward(&self) -> Option<(f32, f32)> {
        if self.dist > 0.2 {
            Some((self.dx / self.dist, self.dz / self.dist))
        } else {
            None
        }
    }
}

/// Scale the velocity by the per-step drag factor.
#[inline]
pub fn apply_drag(velocity: Vec3, env: &EnvironmentState) -> Vec3 {
    velocity * env.drag_factor()
}

/// Add uniform noise of magnitude `ambient_strength` on each axis.
pub fn apply_jitter<R: RandomSource>(velocity: Vec3, env: &EnvironmentState, rng: &mut R) -> Vec3 {
    let strength = env.ambient_strength();
    let x = rng.centered() * strength;
    let y = rng.centered() * strength;
    let z = rng.centered() * strength;
    velocity + Vec3::new(x, y, z)
}

/// Weak lift that fades to zero three units above the floor.
pub fn buoyancy(surroundings: &Surroundings) -> f32 {
    let h = surroundings.height_from_floor;
    let mut lift = BUOYANCY * (1.0 - h / BUOYANCY_FADE_HEIGHT).max(0.0);
    let resting_on_bench = surroundings
        .on_bench
        .is_some_and(|surface| (surroundings.position.y - surface).abs() < CONTACT_DISTANCE);
    if h < CONTACT_DISTANCE || resting_on_bench {
        lift *= CONTACT_DAMPING;
    }
    lift
}

/// Drift toward the open window and/or door.
///
/// Both drafts are strongest on the room's z centre line and vanish three
/// units away from it. Air near the window also sinks.
pub fn opening_drift(velocity: Vec3, surroundings: &Surroundings, env: &EnvironmentState, room: &RoomGeometry) -> Vec3 {
    let mut v = velocity;
    let Vec3 { x, z, .. } = surroundings.position;
    let lateral = (1.0 - z.abs() / 3.0).max(0.0);

    if env.window_open() {
        let proximity = (1.0 - (x + room.bounds.x).abs() / 2.0).max(0.0);
        let influence = lateral * OPENING_DRAFT * (1.0 + proximity);
        v.x -= influence;
        if x < -room.bounds.x * 0.7 {
            v.y -= influence * 0.4;
        }
    }

    if env.door_open() {
        let proximity = (1.0 - (x - room.bounds.x).abs() / 2.0).max(0.0);
        let influence = lateral * OPENING_DRAFT * (1.0 + proximity);
        v.x += influence;
    }

    v
}

/// Compute a particle's velocity after one step of airflow forces.
pub fn update_velocity<R: RandomSource>(
    velocity: Vec3,
    surroundings: &Surroundings,
    env: &EnvironmentState,
    room: &RoomGeometry,
    rng: &mut R,
) -> Vec3 {
    let mut v = apply_drag(velocity, env);
    v = apply_jitter(v, env, rng);
    v.y += buoyancy(surroundings);

    if let Some(zone) = FanZone::classify(surroundings, env, room) {
        v = zone.apply(v, surroundings, env, room, rng);
    }

    opening_drift(v, surroundings, env, room)
}

/// The change [`update_velocity`] makes to `velocity`.
pub fn velocity_delta<R: RandomSource>(
    velocity: Vec3,
    surroundings: &Surroundings,
    env: &EnvironmentState,
    room: &RoomGeometry,
    rng: &mut R,
) -> Vec3 {
    update_velocity(velocity, surroundings, env, room, rng) - velocity
}
