//! Bounding volumes for pointer hit tests

use serde::{Deserialize, Serialize};

use crate::{Point3D, Pose, Ray, Vector3D};

/// Shape of an object in its own local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Bounds {
    /// Axis-aligned box around the local origin
    Box { half_extents: Vector3D },
    Sphere { radius: f32 },
}

impl Bounds {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vector3D) -> Self {
        Self::Box { half_extents }
    }

    /// Radius of the smallest sphere around the local origin enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Bounds::Box { half_extents } => half_extents.magnitude(),
            Bounds::Sphere { radius } => *radius,
        }
    }

    pub fn contains(&self, pose: &Pose, point: Point3D) -> bool {
        let local = pose.relative(&Pose::from_position(point)).position;
        match self {
            Bounds::Box { half_extents } => {
                local.x.abs() <= half_extents.x
                    && local.y.abs() <= half_extents.y
                    && local.z.abs() <= half_extents.z
            }
            Bounds::Sphere { radius } => local.to_vector().magnitude_squared() <= radius * radius,
        }
    }

    /// Distance along `ray` to the first hit with this shape placed at `pose`
    pub fn ray_hit(&self, pose: &Pose, ray: &Ray) -> Option<f32> {
        let inv = pose.inverse();
        let origin = inv.transform_point(ray.origin);
        let direction = inv.transform_vector(ray.direction);

        match self {
            Bounds::Sphere { radius } => {
                let oc = origin.to_vector();
                let b = oc.dot(&direction);
                let c = oc.magnitude_squared() - radius * radius;
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                let sqrt_disc = disc.sqrt();
                let near = -b - sqrt_disc;
                let far = -b + sqrt_disc;
                if far < 0.0 {
                    None
                } else {
                    Some(near.max(0.0))
                }
            }
            Bounds::Box { half_extents } => {
                let mut t_min = 0.0_f32;
                let mut t_max = f32::INFINITY;
                let axes = [
                    (origin.x, direction.x, half_extents.x),
                    (origin.y, direction.y, half_extents.y),
                    (origin.z, direction.z, half_extents.z),
                ];
                for (o, d, h) in axes {
                    if d.abs() < f32::EPSILON {
                        if o.abs() > h {
                            return None;
                        }
                        continue;
                    }
                    let t1 = (-h - o) / d;
                    let t2 = (h - o) / d;
                    t_min = t_min.max(t1.min(t2));
                    t_max = t_max.min(t1.max(t2));
                    if t_min > t_max {
                        return None;
                    }
                }
                Some(t_min)
            }
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::Sphere { radius: 0.05 }
    }
}
