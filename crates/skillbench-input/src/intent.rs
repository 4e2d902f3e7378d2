//! Intent channels and edge detection
//!
//! Analog intent (pinch/grip strength) saturates for many ticks in a row while a
//! user holds an object. Grab and release must fire once per transition, so each
//! channel runs through an [`EdgeDetector`] with a hysteresis band.

use serde::{Deserialize, Serialize};

use crate::HandFrame;

/// One continuous intent signal sampled from a [`HandFrame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentChannel {
    Pinch,
    Grip,
    Button,
}

impl IntentChannel {
    /// Evaluation order; when several channels engage on the same tick the first
    /// one decides the grab style.
    pub const ALL: [IntentChannel; 3] = [IntentChannel::Pinch, IntentChannel::Grip, IntentChannel::Button];

    pub fn read(&self, frame: &HandFrame) -> f32 {
        match self {
            IntentChannel::Pinch => frame.pinch_strength(),
            IntentChannel::Grip => frame.grip_strength(),
            IntentChannel::Button => frame.button_value(),
        }
    }

    /// Style of grab this channel produces
    pub fn style(&self) -> GrabStyle {
        match self {
            IntentChannel::Pinch => GrabStyle::Pinch,
            IntentChannel::Grip => GrabStyle::Grip,
            IntentChannel::Button => GrabStyle::Device,
        }
    }
}

/// Where the grab reference point is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrabStyle {
    /// Midpoint of thumb and index tips
    Pinch,
    /// Palm/grip point
    Grip,
    /// Device position
    Device,
}

impl GrabStyle {
    /// Reference point for this style, falling back to the device position when the
    /// needed tracked points are missing
    pub fn reference_point(&self, frame: &HandFrame) -> skillbench_spatial::Point3D {
        let tracked = match self {
            GrabStyle::Pinch => frame.pinch_point(),
            GrabStyle::Grip => frame.grip_point,
            GrabStyle::Device => None,
        };
        tracked.unwrap_or(frame.pose.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Crossed the engage threshold upward
    Rising,
    /// Dropped below the release threshold
    Falling,
}

/// Engage/release thresholds. `release` must not exceed `engage`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentThresholds {
    pub engage: f32,
    pub release: f32,
}

impl Default for IntentThresholds {
    fn default() -> Self {
        Self {
            engage: 0.8,
            release: 0.5,
        }
    }
}

/// Edge detector for one channel, compared against the previous tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDetector {
    thresholds: IntentThresholds,
    engaged: bool,
}

impl EdgeDetector {
    pub fn new(thresholds: IntentThresholds) -> Self {
        Self {
            thresholds,
            engaged: false,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn update(&mut self, value: f32) -> Option<Edge> {
        if !self.engaged && value >= self.thresholds.engage {
            self.engaged = true;
            Some(Edge::Rising)
        } else if self.engaged && value < self.thresholds.release {
            self.engaged = false;
            Some(Edge::Falling)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbench_spatial::Point3D;

    #[test]
    fn test_single_edge_while_saturated() {
        let mut detector = EdgeDetector::new(IntentThresholds::default());
        let samples = [0.0, 0.9, 1.0, 1.0, 0.95, 0.7, 0.4, 0.0, 0.0];
        let edges: Vec<_> = samples.iter().filter_map(|v| detector.update(*v)).collect();
        assert_eq!(edges, vec![Edge::Rising, Edge::Falling]);
    }

    #[test]
    fn test_hysteresis_band_does_not_chatter() {
        let mut detector = EdgeDetector::new(IntentThresholds::default());
        assert_eq!(detector.update(0.85), Some(Edge::Rising));
        // Oscillating inside the band keeps the channel engaged.
        for v in [0.6, 0.79, 0.55, 0.81] {
            assert_eq!(detector.update(v), None);
        }
        assert!(detector.is_engaged());
    }

    #[test]
    fn test_reference_point_fallbacks() {
        let frame = HandFrame::at_position(Point3D::new(1.0, 1.0, 1.0));
        assert_eq!(GrabStyle::Pinch.reference_point(&frame), Point3D::new(1.0, 1.0, 1.0));

        let frame = frame.with_grip_point(Point3D::new(1.0, 0.9, 1.0));
        assert_eq!(GrabStyle::Grip.reference_point(&frame), Point3D::new(1.0, 0.9, 1.0));
        assert_eq!(GrabStyle::Device.reference_point(&frame), Point3D::new(1.0, 1.0, 1.0));
    }
}
