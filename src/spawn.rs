//! Spawn context for particle initialization.
//!
//! Provides the placement helpers used when the field is first filled.

use crate::random::{spawn_rng, RandomSource};
use crate::room::RoomGeometry;
use glam::Vec3;
use rand::rngs::SmallRng;

/// Margin kept between freshly spawned particles and the walls.
const WALL_MARGIN: f32 = 0.5;
/// Margin kept between freshly spawned particles and floor/ceiling.
const FLOOR_CEILING_MARGIN: f32 = 1.0;

/// Context handed out per particle while the field is being filled.
///
/// Each context owns an RNG derived from the simulation seed and the particle
/// index, so a given seed always produces the same starting field.
pub struct SpawnContext<'a> {
    /// Index of the particle being spawned (0 to count-1).
    pub index: usize,
    /// Total number of particles being spawned.
    pub count: usize,
    /// Room the particle is spawned into.
    pub room: &'a RoomGeometry,
    rng: SmallRng,
}

impl<'a> SpawnContext<'a> {
    /// Create a spawn context for one particle.
    pub(crate) fn new(index: usize, count: usize, room: &'a RoomGeometry, seed: u64) -> Self {
        Self {
            index,
            count,
            room,
            rng: spawn_rng(seed, index),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        self.index as f32 / self.count as f32
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.next_f32()
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.range(min, max)
    }

    // ========== Position helpers ==========

    /// Random point inside an axis-aligned box centred on the horizontal
    /// origin, with an explicit vertical range.
    pub fn random_in_box(&mut self, half_x: f32, half_z: f32, min_y: f32, max_y: f32) -> Vec3 {
        Vec3::new(
            self.rng.range(-half_x, half_x),
            self.rng.range(min_y, max_y),
            self.rng.range(-half_z, half_z),
        )
    }

    /// Random point in the room interior, away from walls, floor and ceiling.
    ///
    /// For the default room this is x in [-7, 7], y in [-2, 2], z in [-5.5, 5.5].
    pub fn random_in_room(&mut self) -> Vec3 {
        let room = self.room;
        self.random_in_box(
            room.bounds.x - WALL_MARGIN,
            room.bounds.z - WALL_MARGIN,
            room.floor_y + FLOOR_CEILING_MARGIN,
            room.ceiling_y - FLOOR_CEILING_MARGIN,
        )
    }

    /// Random render size in [0.02, 0.05].
    pub fn random_size(&mut self) -> f32 {
        0.02 + self.rng.next_f32() * 0.03
    }
}
