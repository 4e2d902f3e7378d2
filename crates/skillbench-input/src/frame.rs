//! Per-tick tracking samples

use serde::{Deserialize, Serialize};
use skillbench_spatial::{Point3D, Pose};

/// Everything a grabber needs from its tracking backend for one tick.
///
/// Finger points are optional: controllers have no thumb/index tips, and hand
/// tracking drops them when confidence is low. Intent channels are normalized to
/// `0.0..=1.0`; out-of-range values are clamped when read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandFrame {
    /// Device/wrist pose. Its forward axis drives the long-range pointer.
    pub pose: Pose,
    pub thumb_tip: Option<Point3D>,
    pub index_tip: Option<Point3D>,
    /// Palm center for grip-style grabs
    pub grip_point: Option<Point3D>,
    /// Pinch strength (thumb to index)
    pub pinch: f32,
    /// Whole-hand grip strength
    pub grip: f32,
    /// Discrete trigger/button, used as the fallback intent
    pub button: bool,
}

impl HandFrame {
    pub fn at(pose: Pose) -> Self {
        Self {
            pose,
            ..Default::default()
        }
    }

    /// Frame at a bare position with identity orientation
    pub fn at_position(position: Point3D) -> Self {
        Self::at(Pose::from_position(position))
    }

    pub fn with_pinch(mut self, strength: f32) -> Self {
        self.pinch = strength;
        self
    }

    pub fn with_grip(mut self, strength: f32) -> Self {
        self.grip = strength;
        self
    }

    pub fn with_button(mut self, pressed: bool) -> Self {
        self.button = pressed;
        self
    }

    pub fn with_fingertips(mut self, thumb: Point3D, index: Point3D) -> Self {
        self.thumb_tip = Some(thumb);
        self.index_tip = Some(index);
        self
    }

    pub fn with_grip_point(mut self, point: Point3D) -> Self {
        self.grip_point = Some(point);
        self
    }

    /// Pinch reference: midpoint between thumb and index tips
    pub fn pinch_point(&self) -> Option<Point3D> {
        match (self.thumb_tip, self.index_tip) {
            (Some(thumb), Some(index)) => Some(thumb.midpoint(&index)),
            _ => None,
        }
    }

    pub fn pinch_strength(&self) -> f32 {
        self.pinch.clamp(0.0, 1.0)
    }

    pub fn grip_strength(&self) -> f32 {
        self.grip.clamp(0.0, 1.0)
    }

    pub fn button_value(&self) -> f32 {
        if self.button {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinch_point_needs_both_tips() {
        let frame = HandFrame::at_position(Point3D::ORIGIN);
        assert!(frame.pinch_point().is_none());

        let frame = frame.with_fingertips(Point3D::new(0.0, 0.0, 0.1), Point3D::new(0.02, 0.0, 0.1));
        let mid = frame.pinch_point().expect("pinch point");
        assert!(mid.approx_eq(&Point3D::new(0.01, 0.0, 0.1), 1e-6));
    }

    #[test]
    fn test_strengths_are_clamped() {
        let frame = HandFrame::default().with_pinch(1.4).with_grip(-0.2);
        assert_eq!(frame.pinch_strength(), 1.0);
        assert_eq!(frame.grip_strength(), 0.0);
    }
}
