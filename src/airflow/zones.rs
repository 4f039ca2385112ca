//! Fan airflow zones.
//!
//! While the fan runs, every particle falls into at most one zone. Zones are
//! tested in a fixed priority order that depends on the fan direction, and
//! each zone has its own force function.
//!
//! # Forward (downdraft) priority
//!
//! | # | Zone | Region |
//! |---|------|--------|
//! | 1 | [`FanZone::CentralColumn`] | under the fan, inside the downdraft radius |
//! | 2 | [`FanZone::FloorSpread`] | lower room, inside the influence radius |
//! | 3 | [`FanZone::BenchSurface`] | over a bench |
//! | 4 | [`FanZone::WallChannel`] | outer 40% of the room, below the fan |
//! | 5 | [`FanZone::CeilingInflow`] | within 0.5 below the fan or higher |
//! | 6 | [`FanZone::Transition`] | anywhere else outside the downdraft radius |
//!
//! # Reverse (updraft) priority
//!
//! | # | Zone | Region |
//! |---|------|--------|
//! | 1 | [`FanZone::CentralColumn`] | under the fan, inside the downdraft radius |
//! | 2 | [`FanZone::BenchSurface`] | over a bench |
//! | 3 | [`FanZone::FloorInflow`] | within 0.3 of the floor, inside 80% of the influence radius |
//! | 4 | [`FanZone::CeilingSpread`] | within 0.5 below the fan or higher |
//! | 5 | [`FanZone::WallChannel`] | outer 40% of the room, above the lower third |
//! | 6 | [`FanZone::Transition`] | anywhere else outside the downdraft radius |
//!
//! Heights like "lower room" are measured from the room's vertical centre.

use super::Surroundings;
use crate::environment::{EnvironmentState, FanDirection};
use crate::random::RandomSource;
use crate::room::RoomGeometry;
use glam::Vec3;

/// Floor spread applies below this height relative to the room centre.
const FLOOR_SPREAD_CEILING: f32 = -1.5;
/// Reverse wall channel applies above this height relative to the room centre.
const WALL_CHANNEL_FLOOR: f32 = -1.0;
/// Wall channels start at this fraction of the half-extent.
const WALL_CHANNEL_START: f32 = 0.6;

/// A region of the room with its own fan-driven force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FanZone {
    /// Column directly under the fan.
    ///
    /// Forward: strong push down, stronger near the axis and just under the
    /// blades, with a slight swirl. Reverse: push up and outward with a swirl
    /// of the opposite handedness.
    CentralColumn,

    /// Forward only. Air that hit the floor radiates outward along it,
    /// with a small lift that is weaker right at the floor.
    FloorSpread,

    /// Reverse only. Air along the floor is drawn toward the fan axis and
    /// kept low, rising only close to the axis.
    FloorInflow,

    /// Forward only. Air under the ceiling is drawn back to the fan and
    /// pushed down once it is over the column.
    CeilingInflow,

    /// Reverse only. Air under the ceiling spreads outward and starts to
    /// sink once past the column.
    CeilingSpread,

    /// Air over a bench.
    ///
    /// Forward: lateral jitter along the surface with damped vertical
    /// motion. Reverse: inward pull and slight lift along the surface. Both
    /// add turbulence close to the bench centre lines.
    BenchSurface,

    /// Air near the walls. Rises (forward) or falls (reverse), with a slight
    /// pull back toward the room centre.
    WallChannel,

    /// Weak horizontal swirl in the middle of the room, reversed in
    /// handedness for the updraft.
    Transition,
}

impl FanZone {
    /// Pick the zone a particle is in, or `None` when the fan is off or no
    /// zone matches.
    pub fn classify(s: &Surroundings, env: &EnvironmentState, room: &RoomGeometry) -> Option<Self> {
        if !env.powered() {
            return None;
        }
        let y = s.position.y;
        let rel_y = y - room.mid_y();
        let downdraft_radius = env.downdraft_radius();
        let influence_radius = env.influence_radius();
        let near_wall = s.position.x.abs() > room.bounds.x * WALL_CHANNEL_START
            || s.position.z.abs() > room.bounds.z * WALL_CHANNEL_START;
        let in_column = s.dist < downdraft_radius && y < room.fan_y;
        let under_ceiling = y > room.fan_y - 0.5;

        let zone = match env.direction() {
            FanDirection::Forward => {
                if in_column {
                    FanZone::CentralColumn
                } else if rel_y < FLOOR_SPREAD_CEILING && s.dist < influence_radius {
                    FanZone::FloorSpread
                } else if s.near_bench.is_some() {
                    FanZone::BenchSurface
                } else if near_wall && y < room.fan_y {
                    FanZone::WallChannel
                } else if under_ceiling {
                    FanZone::CeilingInflow
                } else if s.dist > downdraft_radius {
                    FanZone::Transition
                } else {
                    return None;
                }
            }
            FanDirection::Reverse => {
                if in_column {
                    FanZone::CentralColumn
                } else if s.near_bench.is_some() {
                    FanZone::BenchSurface
                } else if s.height_from_floor < 0.3 && s.dist < influence_radius * 0.8 {
                    FanZone::FloorInflow
                } else if under_ceiling {
                    FanZone::CeilingSpread
                } else if near_wall && rel_y > WALL_CHANNEL_FLOOR {
                    FanZone::WallChannel
                } else if s.dist > downdraft_radius {
                    FanZone::Transition
                } else {
                    return None;
                }
            }
        };
        Some(zone)
    }

    /// Short label for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            FanZone::CentralColumn => "central_column",
            FanZone::FloorSpread => "floor_spread",
            FanZone::FloorInflow => "floor_inflow",
            FanZone::CeilingInflow => "ceiling_inflow",
            FanZone::CeilingSpread => "ceiling_spread",
            FanZone::BenchSurface => "bench_surface",
            FanZone::WallChannel => "wall_channel",
            FanZone::Transition => "transition",
        }
    }

    /// Apply this zone's force to `velocity`.
    pub fn apply<R: RandomSource>(
        self,
        velocity: Vec3,
        s: &Surroundings,
        env: &EnvironmentState,
        room: &RoomGeometry,
        rng: &mut R,
    ) -> Vec3 {
        let forward = env.direction() == FanDirection::Forward;
        match self {
            FanZone::CentralColumn if forward => downdraft(velocity, s, env, room),
            FanZone::CentralColumn => updraft(velocity, s, env),
            FanZone::FloorSpread => floor_spread(velocity, s, env),
            FanZone::FloorInflow => floor_inflow(velocity, s, env),
            FanZone::CeilingInflow => ceiling_inflow(velocity, s, env, room),
            FanZone::CeilingSpread => ceiling_spread(velocity, s, env, room),
            FanZone::BenchSurface if forward => bench_flow_forward(velocity, s, env, rng),
            FanZone::BenchSurface => bench_flow_reverse(velocity, s, env, rng),
            FanZone::WallChannel => wall_channel(velocity, s, env, room),
            FanZone::Transition => transition(velocity, s, env, room),
        }
    }
}

fn downdraft(mut v: Vec3, s: &Surroundings, env: &EnvironmentState, room: &RoomGeometry) -> Vec3 {
    let height_factor = ((room.fan_y - s.position.y) / 2.0).min(1.0);
    let distance_factor = 1.0 - s.dist / env.downdraft_radius();
    let strength = env.fan_strength() * height_factor * distance_factor;

    v.y -= strength * 0.8;

    let spiral = strength * 0.1;
    v.x += s.dz * spiral;
    v.z -= s.dx * spiral;
    v
}

fn updraft(mut v: Vec3, s: &Surroundings, env: &EnvironmentState) -> Vec3 {
    let distance_factor = 1.0 - s.dist / env.downdraft_radius();
    let strength = env.fan_strength() * distance_factor * 0.6;

    v.y += strength;

    if let Some((ox, oz)) = s.outward() {
        v.x += ox * strength * 0.25;
        v.z += oz * strength * 0.25;

        let spiral = strength * 0.08;
        v.x -= s.dz * spiral;
        v.z += s.dx * spiral;
    }
    v
}

fn floor_spread(mut v: Vec3, s: &Surroundings, env: &EnvironmentState) -> Vec3 {
    let h = s.height_from_floor;
    let skimming = h < 0.2;
    let mut floor_factor = (1.0 - h / 1.5).max(0.0);
    if skimming {
        floor_factor *= 1.5;
    }

    let distance_factor = (s.dist / env.downdraft_radius()).min(1.0)
        * (1.0 - (s.dist / env.influence_radius()).min(1.0));
    let outward = env.fan_strength() * floor_factor * distance_factor * 0.5;

    if let Some((ox, oz)) = s.outward() {
        v.x += ox * outward;
        v.z += oz * outward;
    }

    v.y += outward * if skimming { 0.05 } else { 0.15 };
    v
}

fn floor_inflow(mut v: Vec3, s: &Surroundings, env: &EnvironmentState) -> Vec3 {
    let inflow = (1.0 - s.height_from_floor / 0.3).max(0.0) * env.fan_strength() * 0.4;

    if let Some((ox, oz)) = s.outward() {
        v.x -= ox * inflow;
        v.z -= oz * inflow;
    }

    v.y *= 0.9;

    if s.dist < env.downdraft_radius() * 0.5 {
        v.y += inflow * 0.35;
    }
    v
}

fn ceiling_inflow(mut v: Vec3, s: &Surroundings, env: &EnvironmentState, room: &RoomGeometry) -> Vec3 {
    let ceiling_factor = (s.position.y - (room.fan_y - 0.5)).min(1.0);
    let inflow = env.fan_strength() * ceiling_factor * 0.25;

    if let Some((ox, oz)) = s.outward() {
        v.x -= ox * inflow;
        v.z -= oz * inflow;
    }

    if s.dist < env.downdraft_radius() {
        v.y -= inflow * 0.7;
    }
    v
}

fn ceiling_spread(mut v: Vec3, s: &Surroundings, env: &EnvironmentState, room: &RoomGeometry) -> Vec3 {
    let proximity = (s.position.y - (room.fan_y - 0.5)).min(1.0);
    let distance_factor = (s.dist / env.downdraft_radius()).min(1.0)
        * (1.0 - (s.dist / env.influence_radius() * 0.8).min(1.0));
    let outward = env.fan_strength() * proximity * distance_factor * 0.35;

    if let Some((ox, oz)) = s.outward() {
        v.x += ox * outward;
        v.z += oz * outward;
    }

    if s.dist > env.downdraft_radius() {
        v.y -= outward * 0.15;
    }
    v
}

fn bench_flow_forward<R: RandomSource>(mut v: Vec3, s: &Surroundings, env: &EnvironmentState, rng: &mut R) -> Vec3 {
    let Some(bench) = s.near_bench else {
        return v;
    };
    let factor = env.fan_strength() * 0.25;

    if (s.position.y - bench.surface_y).abs() < 0.2 {
        v.x += rng.centered() * factor * 0.5;
        v.z += rng.centered() * factor * 0.5;
        v.y *= 0.9;
    }

    if bench.near_centre_line() {
        v.x += rng.centered() * factor * 0.3;
        v.z += rng.centered() * factor * 0.3;
        v.y += (rng.next_f32() - 0.2) * factor * 0.25;
    }
    v
}

fn bench_flow_reverse<R: RandomSource>(mut v: Vec3, s: &Surroundings, env: &EnvironmentState, rng: &mut R) -> Vec3 {
    let Some(bench) = s.near_bench else {
        return v;
    };
    let factor = env.fan_strength() * 0.25;

    if (s.position.y - bench.surface_y).abs() < 0.2 {
        if let Some((ox, oz)) = s.outward() {
            v.x -= ox * factor * 0.3;
            v.z -= oz * factor * 0.3;
        }
        v.y += factor * 0.12;
        v.y *= 0.9;
    }

    if bench.near_centre_line() {
        v.x += rng.centered() * factor * 0.3;
        v.z += rng.centered() * factor * 0.3;
        v.y += rng.next_f32() * 0.3 * factor * 0.8;
    }
    v
}

fn wall_channel(mut v: Vec3, s: &Surroundings, env: &EnvironmentState, room: &RoomGeometry) -> Vec3 {
    let Vec3 { x, z, .. } = s.position;
    let start_x = room.bounds.x * WALL_CHANNEL_START;
    let start_z = room.bounds.z * WALL_CHANNEL_START;
    let factor_x = ((x.abs() - start_x) / (room.bounds.x * 0.4)).max(0.0);
    let factor_z = ((z.abs() - start_z) / (room.bounds.z * 0.4)).max(0.0);
    let wall = factor_x.max(factor_z) * env.fan_strength() * 0.35;

    v.y += wall * env.direction().sign();

    // Slight pull back toward the room centre.
    if x != 0.0 {
        v.x -= x.signum() * wall * 0.15;
    }
    if z != 0.0 {
        v.z -= z.signum() * wall * 0.15;
    }
    v
}

fn transition(mut v: Vec3, s: &Surroundings, env: &EnvironmentState, room: &RoomGeometry) -> Vec3 {
    let mid_room = (1.0 - (s.position.y - room.mid_y()).abs() / 2.0).max(0.0);
    let swirl = env.fan_strength() * mid_room * 0.1 * env.direction().sign();

    if s.outward().is_some() {
        v.x += s.dz * swirl;
        v.z -= s.dx * swirl;
    }
    v
}
