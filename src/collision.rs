//! Boundary and bench collision response.
//!
//! Runs after the position update. Surfaces are soft: particles are clamped
//! back inside, lose most of their normal velocity with a randomized
//! restitution, and pick up a small tangential kick so they slide along
//! walls, floor and bench tops instead of sticking.
//!
//! Order: benches, x walls, floor, ceiling, z walls.

use crate::airflow::Surroundings;
use crate::environment::EnvironmentState;
use crate::particle::Particle;
use crate::random::RandomSource;
use crate::room::{ObstacleSet, RoomGeometry};

/// Surfaces touched during one resolve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Landed on or hit the underside of a bench.
    pub bench: bool,
    /// Crossed an x wall.
    pub wall_x: bool,
    /// Fell through the floor.
    pub floor: bool,
    /// Rose through the ceiling.
    pub ceiling: bool,
    /// Crossed a z wall.
    pub wall_z: bool,
}

impl Contacts {
    /// Whether any surface was touched.
    pub fn any(&self) -> bool {
        self.bench || self.wall_x || self.floor || self.ceiling || self.wall_z
    }
}

/// Push a moved particle back inside the room and off the benches.
///
/// `before` is the probe taken before the particle moved. Bench crossings
/// are detected between that height and the new one, in the column the
/// particle started from. Particles already resting on a bench are not
/// bench-tested again.
pub fn resolve<R: RandomSource>(
    particle: &mut Particle,
    before: &Surroundings,
    env: &EnvironmentState,
    room: &RoomGeometry,
    obstacles: &ObstacleSet,
    rng: &mut R,
) -> Contacts {
    let strength = env.fan_strength();
    let mut contacts = Contacts::default();
    let p = &mut particle.position;
    let v = &mut particle.velocity;

    if before.on_bench.is_none() {
        let start = before.position;
        for bench in obstacles.values() {
            if !bench.covers(start.x, start.z) {
                continue;
            }
            let surface = bench.surface_y(room);
            if start.y > surface && p.y <= surface {
                // landed on top
                p.y = surface + 0.01;
                v.y *= -0.1 + rng.next_f32() * 0.1;
                v.x += rng.centered() * 0.03 * (1.0 + strength);
                v.z += rng.centered() * 0.03 * (1.0 + strength);
                contacts.bench = true;
            } else if start.y < surface && p.y >= surface {
                // hit the underside
                p.y = surface - 0.01;
                v.y *= -0.1 + rng.next_f32() * 0.1;
                v.x += rng.centered() * 0.02 * (1.0 + strength);
                v.z += rng.centered() * 0.02 * (1.0 + strength);
                contacts.bench = true;
            }
        }
    }

    if p.x.abs() > room.bounds.x {
        p.x = p.x.signum() * room.bounds.x * 0.98;
        v.x *= -0.3 + rng.next_f32() * 0.2;
        v.y += (rng.next_f32() - 0.4) * 0.03 * strength;
        v.z += rng.centered() * 0.03 * strength;
        contacts.wall_x = true;
    }

    if p.y < room.floor_y {
        p.y = room.floor_y + 0.01;
        v.y *= -0.1 + rng.next_f32() * 0.1;
        let boost = 0.03 * (1.0 + strength * 0.5);
        v.x += rng.centered() * boost;
        v.z += rng.centered() * boost;
        if rng.chance(0.03) {
            v.y += 0.003 + strength * 0.003;
        }
        contacts.floor = true;
    }

    if p.y > room.ceiling_y {
        p.y = room.ceiling_y - 0.02;
        v.y *= -0.15 + rng.next_f32() * 0.15;
        v.x += rng.centered() * 0.03 * strength;
        v.z += rng.centered() * 0.03 * strength;
        contacts.ceiling = true;
    }

    if p.z.abs() > room.bounds.z {
        p.z = p.z.signum() * room.bounds.z * 0.98;
        v.z *= -0.3 + rng.next_f32() * 0.2;
        v.x += rng.centered() * 0.03 * strength;
        v.y += (rng.next_f32() - 0.4) * 0.03 * strength;
        contacts.wall_z = true;
    }

    contacts
}
