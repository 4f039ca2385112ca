//! Per-particle temperature update.
//!
//! Temperature relaxes toward a height-based profile (cool floor, warm
//! ceiling) and is nudged by the fan, the floor and ceiling surfaces, and the
//! window and door openings. The result is always clamped to `[0, 1]`.

use crate::environment::{EnvironmentState, FanDirection};
use crate::particle::Particle;
use crate::room::RoomGeometry;

/// Fraction of the gap to the height profile closed each step.
pub const DIFFUSION_RATE: f32 = 0.01;
/// Peak cooling per step under a full-speed downdraft.
pub const FAN_COOLING: f32 = 0.12;
/// Floor cooling per second at floor contact.
pub const FLOOR_COOLING: f32 = 0.08;
/// Ceiling heating per second at ceiling contact.
pub const CEILING_HEATING: f32 = 0.1;
/// Cooling per second next to an open window.
pub const WINDOW_OPEN_COOLING: f32 = 0.2;
/// Cooling per second next to a closed window.
pub const WINDOW_LEAK_COOLING: f32 = 0.02;
/// Temperature of air coming through the door.
pub const OUTSIDE_TEMPERATURE: f32 = 0.5;
/// Share of outside air mixed in per step near an open door.
pub const DOOR_MIXING: f32 = 0.02;

/// Thickness of the floor and ceiling boundary layers.
const SURFACE_LAYER: f32 = 0.5;
/// Window and door zones start at this fraction of the x half-extent.
const OPENING_ZONE: f32 = 0.7;

/// Temperature the height profile settles to at `y`.
#[inline]
pub fn target_temperature(room: &RoomGeometry, y: f32) -> f32 {
    0.3 + 0.6 * room.height_ratio(y)
}

/// Compute a particle's temperature after one step.
pub fn update_temperature(particle: &Particle, env: &EnvironmentState, room: &RoomGeometry, dt: f32) -> f32 {
    let Particle {
        position: p,
        temperature,
        ..
    } = *particle;
    let target = target_temperature(room, p.y);
    let mut temp = temperature + (target - temperature) * DIFFUSION_RATE;

    if env.powered() {
        let dist = (p.x - room.fan_axis.x).hypot(p.z - room.fan_axis.y);
        let radius = env.downdraft_radius();
        if dist < radius {
            let influence = (1.0 - dist / radius) * FAN_COOLING * env.speed() / 5.0;
            match env.direction() {
                FanDirection::Forward if p.y < room.fan_y => temp -= influence,
                // The updraft stirs rather than cools.
                FanDirection::Reverse if p.y > room.fan_y - 1.0 => temp = temp * 0.7 + target * 0.3,
                _ => {}
            }
        }
    }

    let height_from_floor = p.y - room.floor_y;
    if height_from_floor < SURFACE_LAYER {
        temp -= FLOOR_COOLING * (1.0 - height_from_floor / SURFACE_LAYER) * dt;
    }
    if p.y > room.ceiling_y - SURFACE_LAYER {
        temp += CEILING_HEATING * (1.0 - (room.ceiling_y - p.y) / SURFACE_LAYER) * dt;
    }

    if p.x < -room.bounds.x * OPENING_ZONE {
        let rate = if env.window_open() {
            WINDOW_OPEN_COOLING
        } else {
            WINDOW_LEAK_COOLING
        };
        temp -= rate * dt;
    }

    if env.door_open() && p.x > room.bounds.x * OPENING_ZONE {
        temp = temp * (1.0 - DOOR_MIXING) + OUTSIDE_TEMPERATURE * DOOR_MIXING;
    }

    // Also maps NaN to 0 so a bad input can never leak into the color map.
    if temp.is_nan() {
        0.0
    } else {
        temp.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn particle_at(x: f32, y: f32, z: f32, temp: f32) -> Particle {
        Particle::new(Vec3::new(x, y, z), temp, 0.03)
    }

    #[test]
    fn test_relaxes_toward_target() {
        let room = RoomGeometry::default();
        let env = EnvironmentState::new();
        let mut p = particle_at(1.0, 0.0, 1.0, 0.1);
        let target = target_temperature(&room, 0.0);
        assert!((target - 0.6).abs() < 1e-6);

        let mut gap = (target - p.temperature).abs();
        for _ in 0..500 {
            p.temperature = update_temperature(&p, &env, &room, DT);
            let next_gap = (target - p.temperature).abs();
            // Monotone approach: never overshoots, never grows.
            assert!(next_gap <= gap);
            assert!(p.temperature <= target);
            gap = next_gap;
        }
        assert!(gap < 0.01);
    }

    #[test]
    fn test_downdraft_cools_below_fan() {
        let room = RoomGeometry::default();
        let off = EnvironmentState::new();
        let on = EnvironmentState::running(5.0, FanDirection::Forward);
        let p = particle_at(0.0, 0.0, 0.0, 0.6);
        let base = update_temperature(&p, &off, &room, DT);
        let cooled = update_temperature(&p, &on, &room, DT);
        // Full influence on the axis: 0.12 * 5 / 5.
        assert!((base - cooled - 0.12).abs() < 1e-5);

        // Above the fan the downdraft has no thermal effect.
        let high = particle_at(0.0, 2.5, 0.0, 0.6);
        assert_eq!(
            update_temperature(&high, &off, &room, DT),
            update_temperature(&high, &on, &room, DT)
        );
    }

    #[test]
    fn test_updraft_mixes_toward_target() {
        let room = RoomGeometry::default();
        let env = EnvironmentState::running(3.0, FanDirection::Reverse);
        let p = particle_at(0.5, 1.5, 0.0, 1.0);
        let target = target_temperature(&room, 1.5);
        let relaxed = 1.0 + (target - 1.0) * DIFFUSION_RATE;
        let expected = relaxed * 0.7 + target * 0.3;
        assert!((update_temperature(&p, &env, &room, DT) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_floor_cools_and_ceiling_heats() {
        let room = RoomGeometry::default();
        let env = EnvironmentState::new();
        let floor = particle_at(1.0, -3.0, 1.0, 0.3);
        let t = update_temperature(&floor, &env, &room, 1.0);
        assert!((t - (0.3 - FLOOR_COOLING)).abs() < 1e-6);

        let ceiling = particle_at(1.0, 3.0, 1.0, 0.9);
        let t = update_temperature(&ceiling, &env, &room, 0.05);
        assert!((t - (0.9 + CEILING_HEATING * 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_window_cooling_constants() {
        let room = RoomGeometry::default();
        let closed = EnvironmentState::new();
        let open = EnvironmentState::new().with_window_open(true);
        let near = particle_at(-6.0, 0.0, 0.0, 0.6);
        let relaxed = update_temperature(&near, &closed, &room, 0.0);

        let leak = update_temperature(&near, &closed, &room, 0.1);
        assert!((relaxed - leak - WINDOW_LEAK_COOLING * 0.1).abs() < 1e-6);
        let cold = update_temperature(&near, &open, &room, 0.1);
        assert!((relaxed - cold - WINDOW_OPEN_COOLING * 0.1).abs() < 1e-6);

        // Away from the window neither term fires.
        let far = particle_at(0.0, 0.0, 0.0, 0.6);
        assert_eq!(
            update_temperature(&far, &open, &room, 0.1),
            update_temperature(&far, &closed, &room, 0.1)
        );
    }

    #[test]
    fn test_door_mixes_with_outside() {
        let room = RoomGeometry::default();
        let env = EnvironmentState::new().with_door_open(true);
        let p = particle_at(6.0, 0.0, 0.0, 0.6);
        let relaxed = 0.6 + (0.6 - 0.6) * DIFFUSION_RATE;
        let expected = relaxed * 0.98 + 0.5 * 0.02;
        assert!((update_temperature(&p, &env, &room, DT) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_always_clamped() {
        let room = RoomGeometry::default();
        let env = EnvironmentState::running(5.0, FanDirection::Forward).with_window_open(true);
        let cold = particle_at(-7.0, -3.0, 0.0, 0.0);
        assert_eq!(update_temperature(&cold, &env, &room, 0.1), 0.0);
        let hot = particle_at(0.0, 3.0, 0.0, 1.0);
        assert!(update_temperature(&hot, &env, &room, 0.1) <= 1.0);
    }
}
