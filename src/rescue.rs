//! Stagnation rescue.
//!
//! Drag, contact damping and near-zero restitution can leave a particle
//! practically motionless. Any particle slower than [`STAGNATION_SPEED`] gets
//! a small random impulse whose shape depends on where it is: particles on
//! the floor or a bench top are kicked mostly sideways, free particles in
//! every direction.

use crate::airflow::Surroundings;
use crate::particle::Particle;
use crate::random::RandomSource;
use crate::room::RoomGeometry;

/// Speeds below this count as stagnant.
pub const STAGNATION_SPEED: f32 = 0.001;
/// Lift applied when the random impulse happens to cancel out.
const FALLBACK_LIFT: f32 = 0.0005;

/// Where a stagnant particle is sitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestingPlace {
    /// Within 0.2 of the floor.
    Floor,
    /// Over a bench, within 0.2 of its top.
    Bench,
    /// Anywhere else.
    Air,
}

impl RestingPlace {
    /// Classify from the probe taken before the particle moved.
    pub fn of(s: &Surroundings, room: &RoomGeometry) -> Self {
        let y = s.position.y;
        if (y - room.floor_y).abs() < 0.2 {
            RestingPlace::Floor
        } else if s.near_bench.is_some_and(|b| (y - b.surface_y).abs() < 0.2) {
            RestingPlace::Bench
        } else {
            RestingPlace::Air
        }
    }
}

/// Kick the particle if it is stagnant. Returns whether it was kicked.
///
/// After a kick the velocity is never exactly zero.
pub fn rescue<R: RandomSource>(particle: &mut Particle, before: &Surroundings, room: &RoomGeometry, rng: &mut R) -> bool {
    let v = &mut particle.velocity;
    if v.length() >= STAGNATION_SPEED {
        return false;
    }

    v.x += rng.centered() * 0.006;

    match RestingPlace::of(before, room) {
        RestingPlace::Floor => {
            v.y += (rng.next_f32() - 0.3) * 0.002;
            v.x += rng.centered() * 0.008;
            v.z += rng.centered() * 0.008;
        }
        RestingPlace::Bench => {
            v.y += (rng.next_f32() - 0.3) * 0.002;
            v.x += rng.centered() * 0.007;
            v.z += rng.centered() * 0.007;
        }
        RestingPlace::Air => {
            v.y += (rng.next_f32() - 0.3) * 0.006;
            v.z += rng.centered() * 0.006;
        }
    }

    if v.length_squared() <= f32::MIN_POSITIVE {
        v.y += FALLBACK_LIFT;
    }
    true
}
