//! Unit quaternions for orientations

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::Vector3D;

/// An orientation. Stored as `[x, y, z, w]` when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vector3D, angle_radians: f32) -> Self {
        let (sin_half, cos_half) = (angle_radians * 0.5).sin_cos();
        let axis = axis.normalize();
        Self::new(
            axis.x * sin_half,
            axis.y * sin_half,
            axis.z * sin_half,
            cos_half,
        )
    }

    /// Yaw about +Y, then pitch about +X, then roll about +Z. Degrees, as written in
    /// task and catalog files.
    pub fn from_euler_degrees(yaw: f32, pitch: f32, roll: f32) -> Self {
        let yaw = Self::from_axis_angle(Vector3D::UP, yaw.to_radians());
        let pitch = Self::from_axis_angle(Vector3D::RIGHT, pitch.to_radians());
        let roll = Self::from_axis_angle(Vector3D::FORWARD, roll.to_radians());
        (yaw * pitch * roll).normalize()
    }

    pub fn dot(&self, other: &Quaternion) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn normalize(&self) -> Self {
        let mag = self.dot(self).sqrt();
        if mag > 0.0 {
            Self::new(self.x / mag, self.y / mag, self.z / mag, self.w / mag)
        } else {
            Self::IDENTITY
        }
    }

    /// Inverse of a unit quaternion
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn rotate_vector(&self, v: Vector3D) -> Vector3D {
        let q = Vector3D::new(self.x, self.y, self.z);
        let uv = q.cross(&v);
        let uuv = q.cross(&uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Angle in radians between two orientations
    pub fn angle_to(&self, other: &Quaternion) -> f32 {
        let d = self.dot(other).abs().min(1.0);
        2.0 * d.acos()
    }

    /// Shortest-arc spherical interpolation
    pub fn slerp(&self, other: &Quaternion, t: f32) -> Self {
        let mut dot = self.dot(other);
        let mut end = *other;
        if dot < 0.0 {
            end = Quaternion::new(-end.x, -end.y, -end.z, -end.w);
            dot = -dot;
        }

        if dot > 0.9995 {
            return Quaternion::new(
                self.x + t * (end.x - self.x),
                self.y + t * (end.y - self.y),
                self.z + t * (end.z - self.z),
                self.w + t * (end.w - self.w),
            )
            .normalize();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let s1 = theta.sin() / theta_0.sin();
        let s0 = theta.cos() - dot * s1;

        Quaternion::new(
            s0 * self.x + s1 * end.x,
            s0 * self.y + s1 * end.y,
            s0 * self.z + s1 * end.z,
            s0 * self.w + s1 * end.w,
        )
    }

    /// Direction of local +Z after rotation
    pub fn forward(&self) -> Vector3D {
        self.rotate_vector(Vector3D::FORWARD)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl From<Quaternion> for [f32; 4] {
    fn from(q: Quaternion) -> Self {
        [q.x, q.y, q.z, q.w]
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Self) -> Self::Output {
        Quaternion::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_turns_forward_to_right() {
        let q = Quaternion::from_euler_degrees(90.0, 0.0, 0.0);
        let f = q.forward();
        assert!((f.x - 1.0).abs() < 0.0001);
        assert!(f.z.abs() < 0.0001);
    }

    #[test]
    fn test_conjugate_undoes_rotation() {
        let q = Quaternion::from_axis_angle(Vector3D::UP, 0.7);
        let r = q * q.conjugate();
        assert!((r.w - 1.0).abs() < 0.0001);
        assert!(q.angle_to(&q) < 0.001);
    }

    #[test]
    fn test_slerp_endpoints() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_euler_degrees(0.0, 90.0, 0.0);
        assert!(a.slerp(&b, 0.0).angle_to(&a) < 0.001);
        assert!(a.slerp(&b, 1.0).angle_to(&b) < 0.001);
        let half = a.slerp(&b, 0.5);
        assert!((half.angle_to(&a) - std::f32::consts::FRAC_PI_4).abs() < 0.001);
    }
}
