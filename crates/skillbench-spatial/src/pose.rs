//! Rigid poses (position + orientation)

use serde::{Deserialize, Serialize};

use crate::{Point3D, Quaternion, Vector3D};

/// A rigid frame. Interactables, anchors, grabbers and grip offsets are all poses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3D,
    #[serde(default)]
    pub rotation: Quaternion,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Point3D::ORIGIN,
        rotation: Quaternion::IDENTITY,
    };

    pub fn new(position: Point3D, rotation: Quaternion) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Point3D) -> Self {
        Self::new(position, Quaternion::IDENTITY)
    }

    /// Local point to this frame's parent space
    pub fn transform_point(&self, local: Point3D) -> Point3D {
        self.position + self.rotation.rotate_vector(local.to_vector())
    }

    pub fn transform_vector(&self, local: Vector3D) -> Vector3D {
        self.rotation.rotate_vector(local)
    }

    /// `child` expressed in this frame, lifted to this frame's parent space
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.transform_point(child.position),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.conjugate();
        Pose {
            position: rotation.rotate_vector(-self.position.to_vector()).to_point(),
            rotation,
        }
    }

    /// `other` expressed relative to this frame
    pub fn relative(&self, other: &Pose) -> Pose {
        self.inverse().compose(other)
    }

    pub fn forward(&self) -> Vector3D {
        self.rotation.forward()
    }

    pub fn distance(&self, other: &Pose) -> f32 {
        self.position.distance(&other.position)
    }

    /// Both position and orientation within tolerance (meters / radians)
    pub fn approx_eq(&self, other: &Pose, position_tolerance: f32, angle_tolerance: f32) -> bool {
        self.position.approx_eq(&other.position, position_tolerance)
            && self.rotation.angle_to(&other.rotation) <= angle_tolerance
    }

    /// Translate toward `target` by at most `max_step` meters, turning by the same
    /// fraction of the remaining arc. Lands exactly on `target` once within reach.
    pub fn step_towards(&self, target: &Pose, max_step: f32) -> Pose {
        let remaining = self.distance(target);
        if remaining <= max_step {
            return *target;
        }
        let fraction = max_step / remaining;
        Pose {
            position: self.position.move_towards(&target.position, max_step),
            rotation: self.rotation.slerp(&target.rotation, fraction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_point_applies_rotation() {
        let pose = Pose::new(
            Point3D::new(1.0, 0.0, 0.0),
            Quaternion::from_euler_degrees(90.0, 0.0, 0.0),
        );
        let world = pose.transform_point(Point3D::new(0.0, 0.0, 0.5));
        assert!(world.approx_eq(&Point3D::new(1.5, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn test_relative_roundtrip() {
        let parent = Pose::new(
            Point3D::new(0.3, 1.2, -0.4),
            Quaternion::from_euler_degrees(30.0, -10.0, 5.0),
        );
        let child = Pose::new(Point3D::new(0.1, 0.0, 0.05), Quaternion::IDENTITY);
        let world = parent.compose(&child);
        let back = parent.relative(&world);
        assert!(back.approx_eq(&child, 1e-4, 1e-3));
    }

    #[test]
    fn test_step_towards_lands_exactly() {
        let start = Pose::from_position(Point3D::new(0.0, 0.0, 1.0));
        let target = Pose::from_position(Point3D::ORIGIN);

        let mid = start.step_towards(&target, 0.4);
        assert!((mid.position.z - 0.6).abs() < 1e-5);

        let mut pose = mid;
        for _ in 0..5 {
            pose = pose.step_towards(&target, 0.4);
        }
        assert_eq!(pose, target);
    }
}
