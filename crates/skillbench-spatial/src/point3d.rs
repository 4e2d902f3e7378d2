//! Positions in world or local space

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::Vector3D;

/// A position in 3D space (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    /// World origin
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point3D) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance; proximity queries compare these to skip the sqrt
    pub fn distance_squared(&self, other: &Point3D) -> f32 {
        (*other - *self).magnitude_squared()
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(&self, other: &Point3D) -> Self {
        self.lerp(other, 0.5)
    }

    pub fn lerp(&self, other: &Point3D, t: f32) -> Self {
        *self + (*other - *self) * t
    }

    /// Step toward `target` by at most `max_step` meters without overshooting
    pub fn move_towards(&self, target: &Point3D, max_step: f32) -> Self {
        let delta = *target - *self;
        let remaining = delta.magnitude();
        if remaining <= max_step || remaining <= f32::EPSILON {
            *target
        } else {
            *self + delta * (max_step / remaining)
        }
    }

    /// Vector from the origin to this point
    pub fn to_vector(&self) -> Vector3D {
        Vector3D::new(self.x, self.y, self.z)
    }

    pub fn approx_eq(&self, other: &Point3D, tolerance: f32) -> bool {
        self.distance_squared(other) <= tolerance * tolerance
    }
}

impl From<[f32; 3]> for Point3D {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point3D> for [f32; 3] {
    fn from(p: Point3D) -> Self {
        [p.x, p.y, p.z]
    }
}

impl Add<Vector3D> for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Vector3D) -> Self::Output {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub<Vector3D> for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Vector3D) -> Self::Output {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Vector3D;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
