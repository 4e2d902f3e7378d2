//! Rays for long-range pointer targeting

use crate::{Point3D, Pose, Vector3D};

/// A half-line starting at `origin`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3D,
    /// Unit length
    pub direction: Vector3D,
}

impl Ray {
    pub fn new(origin: Point3D, direction: Vector3D) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The forward (+Z) pointer of a device pose
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position, pose.forward())
    }

    pub fn at(&self, t: f32) -> Point3D {
        self.origin + self.direction * t
    }
}
