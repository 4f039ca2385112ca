//! Field statistics for tests, logging and HUDs.

use crate::airflow::{FanZone, Surroundings};
use crate::environment::EnvironmentState;
use crate::particle::{Particle, ParticleField};
use crate::room::{ObstacleSet, RoomGeometry};
use glam::Vec3;
use std::collections::BTreeMap;

/// Slack allowed past the walls before a particle counts as out of bounds.
pub const BOUNDS_EPSILON: f32 = 0.02;

/// Aggregate state of a set of particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStats {
    /// Particles included.
    pub count: usize,
    /// Mean temperature, 0 when empty.
    pub mean_temperature: f32,
    /// Lowest temperature, 0 when empty.
    pub min_temperature: f32,
    /// Highest temperature, 0 when empty.
    pub max_temperature: f32,
    /// Mean velocity vector.
    pub mean_velocity: Vec3,
    /// Mean speed.
    pub mean_speed: f32,
    /// Particles with any non-finite component.
    pub non_finite: usize,
    /// Particles further than [`BOUNDS_EPSILON`] outside the room.
    pub out_of_bounds: usize,
}

impl FieldStats {
    /// Statistics over the whole field.
    pub fn collect(field: &ParticleField, room: &RoomGeometry) -> Self {
        Self::from_particles(field.particles().iter(), room)
    }

    /// Statistics over the particles matching `predicate`.
    pub fn region<F>(field: &ParticleField, room: &RoomGeometry, mut predicate: F) -> Self
    where
        F: FnMut(&Particle) -> bool,
    {
        Self::from_particles(field.particles().iter().filter(|p| predicate(p)), room)
    }

    fn from_particles<'a>(particles: impl Iterator<Item = &'a Particle>, room: &RoomGeometry) -> Self {
        let mut count = 0usize;
        let mut temp_sum = 0.0f64;
        let mut min_t = f32::INFINITY;
        let mut max_t = f32::NEG_INFINITY;
        let mut vel_sum = glam::DVec3::ZERO;
        let mut speed_sum = 0.0f64;
        let mut non_finite = 0usize;
        let mut out_of_bounds = 0usize;

        for p in particles {
            count += 1;
            if !p.is_finite() {
                non_finite += 1;
                continue;
            }
            if !room.contains(p.position, BOUNDS_EPSILON) {
                out_of_bounds += 1;
            }
            temp_sum += p.temperature as f64;
            min_t = min_t.min(p.temperature);
            max_t = max_t.max(p.temperature);
            vel_sum += p.velocity.as_dvec3();
            speed_sum += p.velocity.length() as f64;
        }

        let finite = count - non_finite;
        if finite == 0 {
            return Self {
                count,
                mean_temperature: 0.0,
                min_temperature: 0.0,
                max_temperature: 0.0,
                mean_velocity: Vec3::ZERO,
                mean_speed: 0.0,
                non_finite,
                out_of_bounds,
            };
        }
        let n = finite as f64;
        Self {
            count,
            mean_temperature: (temp_sum / n) as f32,
            min_temperature: min_t,
            max_temperature: max_t,
            mean_velocity: (vel_sum / n).as_vec3(),
            mean_speed: (speed_sum / n) as f32,
            non_finite,
            out_of_bounds,
        }
    }

    /// No non-finite values and nothing outside the room.
    pub fn is_healthy(&self) -> bool {
        self.non_finite == 0 && self.out_of_bounds == 0
    }
}

/// Particle counts per fan zone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneCensus {
    counts: BTreeMap<&'static str, usize>,
    /// Particles outside every zone, or all of them when the fan is off.
    pub unzoned: usize,
}

impl ZoneCensus {
    /// Classify every particle against the current environment.
    pub fn collect(
        field: &ParticleField,
        env: &EnvironmentState,
        room: &RoomGeometry,
        obstacles: &ObstacleSet,
    ) -> Self {
        let mut census = Self::default();
        for p in field.particles() {
            let s = Surroundings::probe(p.position, room, obstacles);
            match FanZone::classify(&s, env, room) {
                Some(zone) => *census.counts.entry(zone.name()).or_insert(0) += 1,
                None => census.unzoned += 1,
            }
        }
        census
    }

    /// Particles in `zone`.
    pub fn count(&self, zone: FanZone) -> usize {
        self.counts.get(zone.name()).copied().unwrap_or(0)
    }

    /// Particles in any zone.
    pub fn zoned(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(zone name, count)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::FanDirection;

    fn field(positions: &[(Vec3, f32)]) -> ParticleField {
        let particles = positions
            .iter()
            .map(|&(pos, t)| Particle::new(pos, t, 0.03))
            .collect();
        ParticleField::from_particles(particles, &RoomGeometry::default()).unwrap()
    }

    #[test]
    fn test_collect_basic() {
        let room = RoomGeometry::default();
        let mut f = field(&[(Vec3::ZERO, 0.2), (Vec3::new(1.0, 1.0, 1.0), 0.6)]);
        f.particles_mut()[0].velocity = Vec3::new(0.0, -2.0, 0.0);
        let stats = FieldStats::collect(&f, &room);
        assert_eq!(stats.count, 2);
        assert!((stats.mean_temperature - 0.4).abs() < 1e-6);
        assert_eq!(stats.min_temperature, 0.2);
        assert_eq!(stats.max_temperature, 0.6);
        assert!((stats.mean_velocity.y + 1.0).abs() < 1e-6);
        assert!((stats.mean_speed - 1.0).abs() < 1e-6);
        assert!(stats.is_healthy());
    }

    #[test]
    fn test_region_and_bounds() {
        let room = RoomGeometry::default();
        let mut f = field(&[(Vec3::new(-6.0, 0.0, 0.0), 0.1), (Vec3::new(7.0, 0.0, 0.0), 0.9)]);
        f.particles_mut()[1].position.x = 7.6;
        let west = FieldStats::region(&f, &room, |p| p.position.x < 0.0);
        assert_eq!(west.count, 1);
        assert_eq!(west.mean_temperature, 0.1);
        let all = FieldStats::collect(&f, &room);
        assert_eq!(all.out_of_bounds, 1);
        assert!(!all.is_healthy());
    }

    #[test]
    fn test_empty_region() {
        let room = RoomGeometry::default();
        let f = field(&[(Vec3::ZERO, 0.5)]);
        let none = FieldStats::region(&f, &room, |_| false);
        assert_eq!(none.count, 0);
        assert_eq!(none.mean_temperature, 0.0);
    }

    #[test]
    fn test_non_finite_counted() {
        let room = RoomGeometry::default();
        let mut f = field(&[(Vec3::ZERO, 0.5), (Vec3::ONE, 0.5)]);
        f.particles_mut()[1].velocity.x = f32::NAN;
        let stats = FieldStats::collect(&f, &room);
        assert_eq!(stats.non_finite, 1);
        assert_eq!(stats.mean_temperature, 0.5);
    }

    #[test]
    fn test_census() {
        let room = RoomGeometry::default();
        let obstacles = ObstacleSet::classroom();
        let f = field(&[(Vec3::new(0.5, 0.0, 0.0), 0.5), (Vec3::new(6.8, -2.0, 0.0), 0.5)]);

        let off = ZoneCensus::collect(&f, &EnvironmentState::new(), &room, &obstacles);
        assert_eq!(off.unzoned, 2);
        assert_eq!(off.zoned(), 0);

        let env = EnvironmentState::running(5.0, FanDirection::Forward);
        let on = ZoneCensus::collect(&f, &env, &room, &obstacles);
        assert_eq!(on.count(FanZone::CentralColumn), 1);
        assert_eq!(on.zoned() + on.unzoned, 2);
    }
}
