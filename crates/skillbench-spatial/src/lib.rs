//! skillbench-spatial: spatial primitives for the interaction engine
//!
//! Right-handed, meters:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)
//!
//! Engine code works exclusively with [`Pose`] (position + orientation). Scale is
//! never part of an interaction frame, so it is not modeled.

mod bounds;
mod point3d;
mod pose;
mod quaternion;
mod ray;
mod vector3d;

pub use bounds::Bounds;
pub use point3d::Point3D;
pub use pose::Pose;
pub use quaternion::Quaternion;
pub use ray::Ray;
pub use vector3d::Vector3D;

/// Default tolerance used by approximate comparisons in this crate.
pub const EPSILON: f32 = 1.0e-5;
