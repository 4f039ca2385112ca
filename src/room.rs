//! Room geometry and static obstacles.
//!
//! The room is an axis-aligned box centred on the horizontal origin. The
//! ceiling fan hangs on a vertical axis through [`RoomGeometry::fan_axis`].
//! Obstacles ("benches") are flat rectangles at a fixed height above the
//! floor, keyed by name so collision and zone lookups iterate a data-driven
//! set.
//!
//! # Example
//!
//! ```
//! use fanflow::room::{Obstacle, ObstacleSet, RoomGeometry};
//!
//! let room = RoomGeometry::default();
//! let mut benches = ObstacleSet::new();
//! benches.insert("desk", Obstacle::new(1.0, 1.0, 0.5, 0.5, 0.8));
//! assert!(benches.validate(&room).is_ok());
//! ```

use crate::error::{ConfigError, Result};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed room dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomGeometry {
    /// Wall half-extents on x and z; `y` is the full room height.
    pub bounds: Vec3,
    /// Floor height.
    pub floor_y: f32,
    /// Ceiling height.
    pub ceiling_y: f32,
    /// Height of the fan blades.
    pub fan_y: f32,
    /// Horizontal (x, z) position of the fan axis.
    pub fan_axis: Vec2,
}

impl Default for RoomGeometry {
    fn default() -> Self {
        Self {
            bounds: Vec3::new(7.5, 6.0, 6.0),
            floor_y: -3.0,
            ceiling_y: 3.0,
            fan_y: 2.2,
            fan_axis: Vec2::ZERO,
        }
    }
}

impl RoomGeometry {
    /// Floor-to-ceiling distance.
    #[inline]
    pub fn height(&self) -> f32 {
        self.ceiling_y - self.floor_y
    }

    /// Height halfway between floor and ceiling.
    #[inline]
    pub fn mid_y(&self) -> f32 {
        (self.floor_y + self.ceiling_y) * 0.5
    }

    /// Normalized height: 0 at the floor, 1 at the ceiling.
    #[inline]
    pub fn height_ratio(&self, y: f32) -> f32 {
        (y - self.floor_y) / self.height()
    }

    /// Whether `p` lies inside the room expanded by `eps` on every side.
    pub fn contains(&self, p: Vec3, eps: f32) -> bool {
        p.x.abs() <= self.bounds.x + eps
            && p.z.abs() <= self.bounds.z + eps
            && p.y >= self.floor_y - eps
            && p.y <= self.ceiling_y + eps
    }

    /// Check that the geometry describes a usable room.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.bounds.x,
            self.bounds.y,
            self.bounds.z,
            self.floor_y,
            self.ceiling_y,
            self.fan_y,
            self.fan_axis.x,
            self.fan_axis.y,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidGeometry("non-finite dimension".into()));
        }
        // Spawning keeps a 0.5 margin from the walls.
        if self.bounds.x <= 0.5 || self.bounds.z <= 0.5 {
            return Err(ConfigError::InvalidGeometry(format!(
                "wall half-extents must exceed 0.5, got x={} z={}",
                self.bounds.x, self.bounds.z
            )));
        }
        // Spawning keeps particles 1.0 away from floor and ceiling.
        if self.height() <= 2.0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "ceiling ({}) must be more than 2 above the floor ({})",
                self.ceiling_y, self.floor_y
            )));
        }
        if self.fan_y <= self.floor_y || self.fan_y > self.ceiling_y {
            return Err(ConfigError::InvalidGeometry(format!(
                "fan height {} outside ({}, {}]",
                self.fan_y, self.floor_y, self.ceiling_y
            )));
        }
        if self.fan_axis.x.abs() >= self.bounds.x || self.fan_axis.y.abs() >= self.bounds.z {
            return Err(ConfigError::InvalidGeometry("fan axis outside the room".into()));
        }
        Ok(())
    }
}

/// A flat axis-aligned rectangle at a fixed height above the floor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Centre x.
    pub center_x: f32,
    /// Centre z.
    pub center_z: f32,
    /// Half of the extent along x.
    pub half_width: f32,
    /// Half of the extent along z.
    pub half_depth: f32,
    /// Surface height above the floor.
    pub height: f32,
}

impl Obstacle {
    /// Create an obstacle from its centre, half-extents and height offset.
    pub fn new(center_x: f32, center_z: f32, half_width: f32, half_depth: f32, height: f32) -> Self {
        Self {
            center_x,
            center_z,
            half_width,
            half_depth,
            height,
        }
    }

    /// Absolute height of the top surface.
    #[inline]
    pub fn surface_y(&self, room: &RoomGeometry) -> f32 {
        room.floor_y + self.height
    }

    /// Distances from the centre lines, `(|x - cx|, |z - cz|)`.
    #[inline]
    pub fn offsets(&self, x: f32, z: f32) -> (f32, f32) {
        ((x - self.center_x).abs(), (z - self.center_z).abs())
    }

    /// Whether the vertical column through `(x, z)` crosses the footprint.
    #[inline]
    pub fn covers(&self, x: f32, z: f32) -> bool {
        let (bx, bz) = self.offsets(x, z);
        bx <= self.half_width && bz <= self.half_depth
    }
}

/// Named obstacles, iterated in name order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleSet {
    entries: BTreeMap<String, Obstacle>,
}

impl ObstacleSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The four classroom benches surrounding the fan, 1.2 above the floor.
    pub fn classroom() -> Self {
        let mut set = Self::new();
        set.insert("north", Obstacle::new(0.0, 4.0, 2.0, 0.5, 1.2));
        set.insert("south", Obstacle::new(0.0, -4.0, 2.0, 0.5, 1.2));
        set.insert("east", Obstacle::new(4.0, 0.0, 0.5, 2.0, 1.2));
        set.insert("west", Obstacle::new(-4.0, 0.0, 0.5, 2.0, 1.2));
        set
    }

    /// Add or replace an obstacle. Returns the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, obstacle: Obstacle) -> Option<Obstacle> {
        self.entries.insert(name.into(), obstacle)
    }

    /// Remove an obstacle by name.
    pub fn remove(&mut self, name: &str) -> Option<Obstacle> {
        self.entries.remove(name)
    }

    /// Look up an obstacle by name.
    pub fn get(&self, name: &str) -> Option<&Obstacle> {
        self.entries.get(name)
    }

    /// Number of obstacles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no obstacles.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate obstacles in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Obstacle)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate obstacles without their names.
    pub fn values(&self) -> impl Iterator<Item = &Obstacle> {
        self.entries.values()
    }

    /// Check every obstacle against the room.
    pub fn validate(&self, room: &RoomGeometry) -> Result<()> {
        for (name, o) in self.iter() {
            let fail = |reason: String| ConfigError::InvalidObstacle {
                name: name.to_string(),
                reason,
            };
            let values = [o.center_x, o.center_z, o.half_width, o.half_depth, o.height];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(fail("non-finite dimension".into()));
            }
            if o.half_width <= 0.0 || o.half_depth <= 0.0 {
                return Err(fail(format!(
                    "half extents must be positive, got {} x {}",
                    o.half_width, o.half_depth
                )));
            }
            if o.height <= 0.0 || o.height >= room.height() {
                return Err(fail(format!(
                    "height {} outside (0, {})",
                    o.height,
                    room.height()
                )));
            }
            if o.center_x.abs() + o.half_width > room.bounds.x
                || o.center_z.abs() + o.half_depth > room.bounds.z
            {
                return Err(fail("footprint extends past the walls".into()));
            }
        }
        Ok(())
    }
}
