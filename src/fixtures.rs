//! Animated room fixtures driven by the environment.
//!
//! Neither fixture feeds back into the particle models. They exist so a host
//! can draw the fan blades and the door panel from the same state the
//! particles react to.

use crate::environment::EnvironmentState;
use crate::room::RoomGeometry;
use log::warn;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Default blade pitch in radians.
pub const DEFAULT_BLADE_PITCH: f32 = 0.1;
/// Largest blade pitch the rotor accepts.
pub const MAX_BLADE_PITCH: f32 = 0.5;

/// Spin state of the fan blades.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FanRotor {
    angle: f32,
    pitch: f32,
}

impl Default for FanRotor {
    fn default() -> Self {
        Self {
            angle: 0.0,
            pitch: DEFAULT_BLADE_PITCH,
        }
    }
}

impl FanRotor {
    /// A stationary rotor at the default pitch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blade angle around the fan axis, in `[0, 2π)`.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Blade pitch in radians.
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set the blade pitch, clamped to `[0, MAX_BLADE_PITCH]`.
    pub fn set_pitch(&mut self, pitch: f32) {
        let clamped = if pitch.is_finite() {
            pitch.clamp(0.0, MAX_BLADE_PITCH)
        } else {
            DEFAULT_BLADE_PITCH
        };
        if clamped != pitch {
            warn!("blade pitch {} clamped to {}", pitch, clamped);
        }
        self.pitch = clamped;
    }

    /// Spin by `speed * dt` in the fan's direction. Does nothing while off.
    pub fn advance(&mut self, env: &EnvironmentState, dt: f32) {
        if !env.powered() {
            return;
        }
        let turned = self.angle + env.speed() * dt * env.direction().sign();
        self.angle = turned.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if self.angle >= TAU {
            self.angle = 0.0;
        }
    }
}

/// Sliding door panel on the +x wall.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorLeaf {
    x: f32,
}

impl DoorLeaf {
    /// Easing factor applied each frame.
    pub const EASING: f32 = 0.1;

    /// A door resting in its closed position.
    pub fn closed(room: &RoomGeometry) -> Self {
        Self {
            x: Self::closed_x(room),
        }
    }

    /// Panel x when fully open.
    pub fn open_x(room: &RoomGeometry) -> f32 {
        room.bounds.x - 0.5
    }

    /// Panel x when fully closed.
    pub fn closed_x(room: &RoomGeometry) -> f32 {
        room.bounds.x - 1.9
    }

    /// Current panel x.
    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Where the panel is heading for the given environment.
    pub fn target(env: &EnvironmentState, room: &RoomGeometry) -> f32 {
        if env.door_open() {
            Self::open_x(room)
        } else {
            Self::closed_x(room)
        }
    }

    /// Ease one frame toward the target position.
    pub fn advance(&mut self, env: &EnvironmentState, room: &RoomGeometry) {
        let target = Self::target(env, room);
        self.x += (target - self.x) * Self::EASING;
    }
}
