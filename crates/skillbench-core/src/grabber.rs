//! Grabbers: one per tracked hand or controller
//!
//! A grabber polls its [`TrackingSource`] once per tick and turns the analog
//! intent channels into at most one grab or release edge.

use std::fmt;

use skillbench_config::GrabberSettings;
use skillbench_input::{Edge, EdgeDetector, GrabStyle, HandFrame, IntentChannel, IntentThresholds, TrackingSource};
use skillbench_spatial::{Point3D, Pose, Ray};

use crate::ids::{GrabberId, InteractableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabIntent {
    Grab,
    Release,
}

pub struct Grabber {
    id: GrabberId,
    name: String,
    source: Box<dyn TrackingSource>,
    frame: HandFrame,
    channels: Vec<(IntentChannel, EdgeDetector)>,
    style: GrabStyle,
    reference: Point3D,
    held: Option<InteractableId>,
    grab_radius: f32,
    pointer_range: f32,
}

impl fmt::Debug for Grabber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grabber")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("style", &self.style)
            .field("reference", &self.reference)
            .field("held", &self.held)
            .finish()
    }
}

impl Grabber {
    pub(crate) fn new(
        id: GrabberId,
        name: impl Into<String>,
        source: Box<dyn TrackingSource>,
        settings: &GrabberSettings,
    ) -> Self {
        let thresholds = IntentThresholds {
            engage: settings.engage_threshold,
            release: settings.release_threshold,
        };
        Self {
            id,
            name: name.into(),
            source,
            frame: HandFrame::default(),
            channels: IntentChannel::ALL
                .iter()
                .map(|channel| (*channel, EdgeDetector::new(thresholds)))
                .collect(),
            style: GrabStyle::Pinch,
            reference: Point3D::ORIGIN,
            held: None,
            grab_radius: settings.grab_radius,
            pointer_range: settings.pointer_range,
        }
    }

    pub fn id(&self) -> GrabberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest tracked frame
    pub fn frame(&self) -> &HandFrame {
        &self.frame
    }

    pub fn pose(&self) -> Pose {
        self.frame.pose
    }

    /// Grab reference point for the current style
    pub fn reference_point(&self) -> Point3D {
        self.reference
    }

    pub fn style(&self) -> GrabStyle {
        self.style
    }

    pub fn held(&self) -> Option<InteractableId> {
        self.held
    }

    pub fn grab_radius(&self) -> f32 {
        self.grab_radius
    }

    pub fn pointer_range(&self) -> f32 {
        self.pointer_range
    }

    /// Forward ray from the device pose
    pub fn pointer(&self) -> Ray {
        Ray::from_pose(&self.frame.pose)
    }

    /// Whether any intent channel is engaged
    pub fn is_engaged(&self) -> bool {
        self.channels.iter().any(|(_, detector)| detector.is_engaged())
    }

    pub(crate) fn set_held(&mut self, held: Option<InteractableId>) {
        self.held = held;
    }

    /// Poll the source and update intent. A tick without a new frame keeps the
    /// previous one. Returns `Grab` when the first channel engages and `Release`
    /// when the last one lets go.
    pub(crate) fn sample(&mut self) -> Option<GrabIntent> {
        if let Some(frame) = self.source.poll() {
            self.frame = frame;
        }

        let was_engaged = self.is_engaged();
        let mut first_rising = None;
        for (channel, detector) in &mut self.channels {
            if detector.update(channel.read(&self.frame)) == Some(Edge::Rising) && first_rising.is_none() {
                first_rising = Some(*channel);
            }
        }
        let engaged = self.is_engaged();

        let intent = match (was_engaged, engaged) {
            (false, true) => {
                self.style = first_rising.map_or(GrabStyle::Device, |channel| channel.style());
                Some(GrabIntent::Grab)
            }
            (true, false) => Some(GrabIntent::Release),
            _ => None,
        };
        if !engaged && intent.is_none() {
            self.style = idle_style(&self.frame);
        }
        self.reference = self.style.reference_point(&self.frame);
        intent
    }
}

/// Style used for hover while nothing is engaged: the most precise point the
/// frame provides
fn idle_style(frame: &HandFrame) -> GrabStyle {
    if frame.pinch_point().is_some() {
        GrabStyle::Pinch
    } else if frame.grip_point.is_some() {
        GrabStyle::Grip
    } else {
        GrabStyle::Device
    }
}
