//! Externally controlled fan and room-opening state.
//!
//! The control surface mutates an [`EnvironmentState`] between frames. A step
//! reads it as an immutable snapshot, so every model takes `&EnvironmentState`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Upper bound of the fan speed dial.
pub const MAX_FAN_SPEED: f32 = 5.0;

/// Fan rotation direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanDirection {
    /// Downdraft ("summer").
    #[default]
    Forward,
    /// Updraft ("winter").
    Reverse,
}

impl FanDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            FanDirection::Forward => FanDirection::Reverse,
            FanDirection::Reverse => FanDirection::Forward,
        }
    }

    /// +1 for forward, -1 for reverse.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            FanDirection::Forward => 1.0,
            FanDirection::Reverse => -1.0,
        }
    }
}

/// Combined power/direction state of the fan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FanMode {
    /// Fan is switched off.
    Off,
    /// Powered, pushing air down.
    Forward,
    /// Powered, pulling air up.
    Reverse,
}

/// Snapshot of everything the controls can change.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentState {
    powered: bool,
    speed: f32,
    direction: FanDirection,
    window_open: bool,
    door_open: bool,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self {
            powered: false,
            speed: 0.0,
            direction: FanDirection::Forward,
            window_open: false,
            door_open: false,
        }
    }
}

impl EnvironmentState {
    /// Fan off, speed 0, forward, both openings closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: powered fan at `speed` in `direction`.
    pub fn running(speed: f32, direction: FanDirection) -> Self {
        let mut env = Self::new();
        env.set_powered(true);
        env.set_speed(speed);
        env.set_direction(direction);
        env
    }

    /// Builder: set the window state.
    pub fn with_window_open(mut self, open: bool) -> Self {
        self.set_window_open(open);
        self
    }

    /// Builder: set the door state.
    pub fn with_door_open(mut self, open: bool) -> Self {
        self.set_door_open(open);
        self
    }

    // ========== Accessors ==========

    /// Whether the fan is switched on.
    #[inline]
    pub fn powered(&self) -> bool {
        self.powered
    }

    /// Dial speed in `[0, 5]`.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Rotation direction.
    #[inline]
    pub fn direction(&self) -> FanDirection {
        self.direction
    }

    /// Whether the window is open.
    #[inline]
    pub fn window_open(&self) -> bool {
        self.window_open
    }

    /// Whether the door is open.
    #[inline]
    pub fn door_open(&self) -> bool {
        self.door_open
    }

    /// Power and direction folded together.
    pub fn fan_mode(&self) -> FanMode {
        match (self.powered, self.direction) {
            (false, _) => FanMode::Off,
            (true, FanDirection::Forward) => FanMode::Forward,
            (true, FanDirection::Reverse) => FanMode::Reverse,
        }
    }

    // ========== Commands ==========

    /// Switch the fan on or off.
    pub fn set_powered(&mut self, powered: bool) {
        debug!("fan power -> {}", powered);
        self.powered = powered;
    }

    /// Flip the power switch.
    pub fn toggle_power(&mut self) {
        self.set_powered(!self.powered);
    }

    /// Set the dial speed. Out-of-range values are clamped to `[0, 5]`,
    /// non-finite values reset the dial to 0.
    pub fn set_speed(&mut self, speed: f32) {
        let clamped = if speed.is_finite() {
            speed.clamp(0.0, MAX_FAN_SPEED)
        } else {
            0.0
        };
        if clamped != speed {
            warn!("fan speed {} out of range, using {}", speed, clamped);
        }
        debug!("fan speed -> {}", clamped);
        self.speed = clamped;
    }

    /// Set the rotation direction.
    pub fn set_direction(&mut self, direction: FanDirection) {
        debug!("fan direction -> {:?}", direction);
        self.direction = direction;
    }

    /// Reverse the rotation direction.
    pub fn toggle_direction(&mut self) {
        self.set_direction(self.direction.reversed());
    }

    /// Open or close the window.
    pub fn set_window_open(&mut self, open: bool) {
        debug!("window open -> {}", open);
        self.window_open = open;
    }

    /// Open or close the door.
    pub fn set_door_open(&mut self, open: bool) {
        debug!("door open -> {}", open);
        self.door_open = open;
    }

    /// Re-apply the setter invariants to a snapshot that was built some
    /// other way (e.g. deserialized).
    pub fn sanitized(mut self) -> Self {
        let speed = self.speed;
        self.set_speed(speed);
        self
    }

    // ========== Derived quantities ==========

    /// Fan force scale: `speed * 0.08` while powered, otherwise 0.
    #[inline]
    pub fn fan_strength(&self) -> f32 {
        if self.powered {
            self.speed * 0.08
        } else {
            0.0
        }
    }

    /// Radius of the column directly under the fan.
    #[inline]
    pub fn downdraft_radius(&self) -> f32 {
        2.5 + self.speed * 0.1
    }

    /// Radius of the fan's wider circulation.
    #[inline]
    pub fn influence_radius(&self) -> f32 {
        5.0 + self.speed * 0.2
    }

    /// Per-step velocity multiplier.
    #[inline]
    pub fn drag_factor(&self) -> f32 {
        if self.powered {
            0.97 - self.speed * 0.001
        } else {
            0.97
        }
    }

    /// Magnitude of the per-axis ambient jitter.
    #[inline]
    pub fn ambient_strength(&self) -> f32 {
        0.0008 + self.speed * 0.00005
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_off() {
        let env = EnvironmentState::new();
        assert_eq!(env.fan_mode(), FanMode::Off);
        assert_eq!(env.fan_strength(), 0.0);
        assert_eq!(env.drag_factor(), 0.97);
    }

    #[test]
    fn test_speed_clamped() {
        let mut env = EnvironmentState::new();
        env.set_speed(7.5);
        assert_eq!(env.speed(), 5.0);
        env.set_speed(-1.0);
        assert_eq!(env.speed(), 0.0);
        env.set_speed(f32::NAN);
        assert_eq!(env.speed(), 0.0);
        env.set_speed(2.5);
        assert_eq!(env.speed(), 2.5);
    }

    #[test]
    fn test_mode_transitions() {
        let mut env = EnvironmentState::new();
        env.toggle_power();
        assert_eq!(env.fan_mode(), FanMode::Forward);
        env.toggle_direction();
        assert_eq!(env.fan_mode(), FanMode::Reverse);
        env.toggle_power();
        assert_eq!(env.fan_mode(), FanMode::Off);
        // Direction survives a power cycle.
        env.toggle_power();
        assert_eq!(env.fan_mode(), FanMode::Reverse);
    }

    #[test]
    fn test_derived_quantities() {
        let env = EnvironmentState::running(5.0, FanDirection::Forward);
        assert!((env.fan_strength() - 0.4).abs() < 1e-6);
        assert!((env.downdraft_radius() - 3.0).abs() < 1e-6);
        assert!((env.influence_radius() - 6.0).abs() < 1e-6);
        assert!((env.drag_factor() - 0.965).abs() < 1e-6);
        assert!((env.ambient_strength() - 0.00105).abs() < 1e-7);
    }

    #[test]
    fn test_sanitized_clamps_deserialized_speed() {
        let env: EnvironmentState = serde_json::from_str(r#"{"powered":true,"speed":12.0}"#).unwrap();
        assert_eq!(env.speed(), 12.0);
        assert_eq!(env.sanitized().speed(), 5.0);
    }
}
