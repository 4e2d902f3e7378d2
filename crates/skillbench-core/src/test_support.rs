//! Shared fixtures for unit tests

use skillbench_config::{AnchorSpec, Category};
use skillbench_input::HandFrame;
use skillbench_spatial::{Point3D, Pose};

use crate::anchor::AnchorSet;
use crate::events::EventBus;
use crate::ids::{AnchorId, InteractableId};
use crate::interactable::{Interactable, InteractableSpec, Links};
use crate::validator::ConstraintValidator;

pub(crate) fn wire(id: u32, category: Option<Category>, capacity: u32) -> Interactable {
    let mut spec = InteractableSpec::new(format!("wire_{id}"), Pose::IDENTITY).with_capacity(capacity);
    if let Some(category) = category {
        spec = spec.with_category(category);
    }
    Interactable::new(InteractableId::new(id), spec)
}

/// Anchors and an event queue, for driving an [`Interactable`] without a world
#[derive(Debug, Default)]
pub(crate) struct Rig {
    pub(crate) anchors: AnchorSet,
    pub(crate) events: EventBus,
}

impl Rig {
    pub(crate) fn anchor(&mut self, spec: AnchorSpec) -> AnchorId {
        self.anchors.register(&spec)
    }

    pub(crate) fn links(&mut self) -> Links<'_> {
        Links {
            anchors: &mut self.anchors,
            validator: &ConstraintValidator,
            events: &mut self.events,
        }
    }
}

/// Hand with both fingertips at `point`, so the pinch reference is exactly `point`
pub(crate) fn pinch_at(point: Point3D, strength: f32) -> HandFrame {
    HandFrame::at_position(point)
        .with_fingertips(point, point)
        .with_pinch(strength)
}

/// Tiny deterministic generator for randomized scenarios
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }

    pub(crate) fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    pub(crate) fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}
