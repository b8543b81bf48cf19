//! World-space vector math.
//!
//! The host world reports positions and terrain heights as floats, so the
//! engine works in `f32` world units. `y` is the vertical axis; `x` and `z`
//! span the ground plane.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// World-space position or offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate (ground plane).
    pub x: f32,
    /// Y coordinate (elevation).
    pub y: f32,
    /// Z coordinate (ground plane).
    pub z: f32,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Same horizontal position with a different elevation.
    #[must_use]
    pub const fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    /// Squared distance on the ground plane (ignores `y`).
    #[must_use]
    pub fn horizontal_distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// Distance on the ground plane (ignores `y`).
    #[must_use]
    pub fn horizontal_distance(self, other: Self) -> f32 {
        self.horizontal_distance_squared(other).sqrt()
    }

    /// Squared 3D distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let d = self - other;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    /// 3D distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
