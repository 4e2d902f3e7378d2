//! Interactables and their state machine
//!
//! ```text
//! Idle <-> Hovered -> Grabbed -> Attached
//!                        |  \-> Returning -> Idle
//!                        \---> Idle (return policy off)
//! Attached -> Grabbed (re-grab detaches first)
//! any -> Idle (force release)
//! ```
//!
//! An object is held by at most one grabber and attached to at most one anchor,
//! never both at once. Every transition queues an
//! [`InteractionEvent::StateChanged`].

use std::fmt;

use serde::{Deserialize, Serialize};
use skillbench_config::Category;
use skillbench_spatial::{Bounds, Point3D, Pose, Quaternion};
use tracing::{debug, warn};

use crate::anchor::{AnchorFilter, AnchorPoint, AnchorSet};
use crate::events::{EventBus, InteractionEvent};
use crate::ids::{AnchorId, GrabberId, InteractableId};
use crate::validator::{ConstraintValidator, Rejection, Validator, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    Hovered,
    Grabbed,
    Attached,
    Returning,
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionState::Idle => "idle",
            InteractionState::Hovered => "hovered",
            InteractionState::Grabbed => "grabbed",
            InteractionState::Attached => "attached",
            InteractionState::Returning => "returning",
        };
        f.write_str(name)
    }
}

/// Which frame an interactable's pose is driven by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    #[default]
    World,
    Grabber(GrabberId),
    Anchor(AnchorId),
}

/// Host physics flags. Disabled while held, restored on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhysicsFlags {
    pub simulated: bool,
    pub gravity: bool,
}

impl PhysicsFlags {
    pub const DYNAMIC: Self = Self {
        simulated: true,
        gravity: true,
    };
    pub const KINEMATIC: Self = Self {
        simulated: false,
        gravity: false,
    };
}

impl Default for PhysicsFlags {
    fn default() -> Self {
        Self::DYNAMIC
    }
}

/// Compatibility metadata checked by [`ConstraintValidator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TypeTag {
    pub category: Option<Category>,
    pub capacity: u32,
}

/// Working tip of a hand tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToolProfile {
    /// Tip position in the tool's local frame
    pub tip_offset: Point3D,
    pub activation_distance: f32,
}

impl ToolProfile {
    pub const DEFAULT_ACTIVATION_DISTANCE: f32 = 0.02;

    pub fn new(tip_offset: Point3D) -> Self {
        Self {
            tip_offset,
            activation_distance: Self::DEFAULT_ACTIVATION_DISTANCE,
        }
    }
}

/// Everything needed to spawn an interactable
#[derive(Debug, Clone, PartialEq)]
pub struct InteractableSpec {
    pub name: String,
    pub kind: String,
    pub tag: TypeTag,
    /// Where the object starts and where it returns to
    pub origin: Pose,
    pub grip_offset: Pose,
    pub grab_radius: f32,
    pub bounds: Option<Bounds>,
    pub tool: Option<ToolProfile>,
    pub grabbable: bool,
    pub physics: PhysicsFlags,
}

impl InteractableSpec {
    pub const DEFAULT_GRAB_RADIUS: f32 = 0.06;

    pub fn new(name: impl Into<String>, origin: Pose) -> Self {
        Self {
            name: name.into(),
            kind: String::new(),
            tag: TypeTag::default(),
            origin,
            grip_offset: Pose::IDENTITY,
            grab_radius: Self::DEFAULT_GRAB_RADIUS,
            bounds: None,
            tool: None,
            grabbable: true,
            physics: PhysicsFlags::DYNAMIC,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.tag.category = Some(category);
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.tag.capacity = capacity;
        self
    }

    pub fn with_grip_offset(mut self, grip_offset: Pose) -> Self {
        self.grip_offset = grip_offset;
        self
    }

    pub fn with_grab_radius(mut self, radius: f32) -> Self {
        self.grab_radius = radius;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_tool(mut self, tool: ToolProfile) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Scenery: hoverable never, grabbable never
    pub fn fixed(mut self) -> Self {
        self.grabbable = false;
        self
    }
}

/// Why a grab did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GrabRefusal {
    #[error("already held by {0}")]
    HeldBy(GrabberId),
    #[error("not grabbable")]
    NotGrabbable,
    #[error("returning to origin")]
    Returning,
}

/// What a release did
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    Attached(AnchorId),
    /// Flying home; carries the rejection if an anchor refused the object
    Returning(Option<Rejection>),
    /// Left where it was dropped (return policy off)
    Dropped(Option<Rejection>),
    NotHeld,
}

impl ReleaseOutcome {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ReleaseOutcome::Returning(reason) | ReleaseOutcome::Dropped(reason) => reason.as_ref(),
            ReleaseOutcome::Attached(_) | ReleaseOutcome::NotHeld => None,
        }
    }
}

/// Mutable engine state a transition may touch besides the object itself
pub(crate) struct Links<'a> {
    pub(crate) anchors: &'a mut AnchorSet,
    pub(crate) validator: &'a ConstraintValidator,
    pub(crate) events: &'a mut EventBus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    id: InteractableId,
    name: String,
    kind: String,
    tag: TypeTag,
    origin: Pose,
    pose: Pose,
    grip_offset: Pose,
    grab_radius: f32,
    bounds: Option<Bounds>,
    tool: Option<ToolProfile>,
    grabbable: bool,
    state: InteractionState,
    holder: Option<GrabberId>,
    attached_to: Option<AnchorId>,
    parent: Parent,
    physics: PhysicsFlags,
    saved_physics: Option<PhysicsFlags>,
}

impl Interactable {
    pub(crate) fn new(id: InteractableId, spec: InteractableSpec) -> Self {
        Self {
            id,
            name: spec.name,
            kind: spec.kind,
            tag: spec.tag,
            origin: spec.origin,
            pose: spec.origin,
            grip_offset: spec.grip_offset,
            grab_radius: spec.grab_radius,
            bounds: spec.bounds,
            tool: spec.tool,
            grabbable: spec.grabbable,
            state: InteractionState::Idle,
            holder: None,
            attached_to: None,
            parent: Parent::World,
            physics: spec.physics,
            saved_physics: None,
        }
    }

    pub fn id(&self) -> InteractableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn origin(&self) -> Pose {
        self.origin
    }

    pub fn grip_offset(&self) -> Pose {
        self.grip_offset
    }

    pub fn grab_radius(&self) -> f32 {
        self.grab_radius
    }

    pub fn tool(&self) -> Option<&ToolProfile> {
        self.tool.as_ref()
    }

    pub fn is_grabbable(&self) -> bool {
        self.grabbable
    }

    pub fn holder(&self) -> Option<GrabberId> {
        self.holder
    }

    pub fn attached_to(&self) -> Option<AnchorId> {
        self.attached_to
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    pub fn physics(&self) -> PhysicsFlags {
        self.physics
    }

    /// Shape used for pointer hits; a sphere of the grab radius when unset
    pub fn pickup_bounds(&self) -> Bounds {
        self.bounds.unwrap_or(Bounds::sphere(self.grab_radius))
    }

    /// World-space tool tip, for tools
    pub fn tool_tip(&self) -> Option<Point3D> {
        self.tool.map(|tool| self.pose.transform_point(tool.tip_offset))
    }

    /// Free to be picked up right now
    pub fn can_be_grabbed(&self) -> bool {
        self.grabbable && self.holder.is_none() && self.state != InteractionState::Returning
    }

    fn transition(
        &mut self,
        to: InteractionState,
        anchor: Option<AnchorId>,
        grabber: Option<GrabberId>,
        events: &mut EventBus,
    ) {
        let from = self.state;
        self.state = to;
        debug!("{} '{}': {} -> {}", self.id, self.name, from, to);
        events.push(InteractionEvent::StateChanged {
            object: self.id,
            from,
            to,
            anchor,
            grabber,
        });
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool, events: &mut EventBus) {
        match (self.state, hovered) {
            (InteractionState::Idle, true) if self.grabbable => {
                self.transition(InteractionState::Hovered, None, None, events)
            }
            (InteractionState::Hovered, false) => self.transition(InteractionState::Idle, None, None, events),
            _ => {}
        }
    }

    /// Take hold of the object. An attached object is detached from its anchor
    /// first.
    pub(crate) fn begin_grab(&mut self, grabber: GrabberId, links: &mut Links<'_>) -> Result<(), GrabRefusal> {
        if let Some(holder) = self.holder {
            return Err(GrabRefusal::HeldBy(holder));
        }
        if !self.grabbable {
            return Err(GrabRefusal::NotGrabbable);
        }
        if self.state == InteractionState::Returning {
            return Err(GrabRefusal::Returning);
        }

        let vacated = self.leave_anchor(links.anchors);
        self.saved_physics = Some(self.physics);
        self.physics = PhysicsFlags::KINEMATIC;
        self.holder = Some(grabber);
        self.parent = Parent::Grabber(grabber);
        self.transition(InteractionState::Grabbed, vacated, Some(grabber), links.events);
        Ok(())
    }

    /// Track the grab reference point. Only moves the object while grabbed.
    pub(crate) fn follow(&mut self, reference: Point3D, orientation: Quaternion) {
        if self.state == InteractionState::Grabbed {
            self.pose = Pose::new(reference, orientation).compose(&self.grip_offset);
        }
    }

    /// Let go. Snaps to the nearest free anchor in reach that accepts this
    /// object, otherwise returns home or stays put depending on
    /// `return_on_invalid`. When nothing in reach accepts it, the nearest
    /// anchor in reach supplies the reported rejection.
    pub(crate) fn release(&mut self, links: &mut Links<'_>, return_on_invalid: bool) -> ReleaseOutcome {
        if self.state != InteractionState::Grabbed {
            return ReleaseOutcome::NotHeld;
        }
        let grabber = self.holder.take();
        self.restore_physics();
        self.parent = Parent::World;

        let position = self.pose.position;
        let validator = links.validator;
        let candidate: &Interactable = self;
        let accepting = links.anchors.nearest_where(position, |anchor| {
            !anchor.is_occupied() && validator.evaluate(candidate, anchor).is_approved()
        });

        if let Some(anchor) = accepting.and_then(|id| links.anchors.get_mut(id)) {
            let anchor_id = anchor.id();
            if self.snap_to(anchor, validator).is_ok() {
                self.transition(InteractionState::Attached, Some(anchor_id), grabber, links.events);
                return ReleaseOutcome::Attached(anchor_id);
            }
        }

        let refused = links
            .anchors
            .nearest(position, &AnchorFilter::any())
            .and_then(|id| links.anchors.get(id))
            .and_then(|anchor| {
                let reason = match anchor.current_occupant() {
                    Some(occupant) => Rejection::Occupied {
                        anchor: anchor.id(),
                        occupant,
                    },
                    None => validator.evaluate(&*self, anchor).rejection()?.clone(),
                };
                Some((anchor.id(), reason))
            });

        let reason = refused.map(|(anchor, reason)| {
            debug!("{} refused by {}: {}", self.id, anchor, reason);
            links.events.push(InteractionEvent::Rejected {
                object: self.id,
                anchor: Some(anchor),
                reason: reason.clone(),
            });
            reason
        });

        if return_on_invalid {
            self.transition(InteractionState::Returning, None, grabber, links.events);
            ReleaseOutcome::Returning(reason)
        } else {
            self.transition(InteractionState::Idle, None, grabber, links.events);
            ReleaseOutcome::Dropped(reason)
        }
    }

    /// Put an unheld object straight onto `anchor_id`, moving it off any anchor
    /// it is on now. Nothing changes unless the verdict is `Approved`. `None` if
    /// the anchor does not exist.
    pub(crate) fn place(&mut self, anchor_id: AnchorId, links: &mut Links<'_>) -> Option<Verdict> {
        let anchor = links.anchors.get(anchor_id)?;
        match anchor.current_occupant() {
            Some(occupant) if occupant == self.id => return Some(Verdict::Approved),
            Some(occupant) => {
                let reason = Rejection::Occupied {
                    anchor: anchor_id,
                    occupant,
                };
                return Some(self.refuse(anchor_id, reason, links.events));
            }
            None => {}
        }
        if let Verdict::Rejected(reason) = links.validator.evaluate(self, anchor) {
            return Some(self.refuse(anchor_id, reason, links.events));
        }

        self.leave_anchor(links.anchors);
        let anchor = links.anchors.get_mut(anchor_id)?;
        if let Err(reason) = self.snap_to(anchor, links.validator) {
            return Some(self.refuse(anchor_id, reason, links.events));
        }
        self.transition(InteractionState::Attached, Some(anchor_id), None, links.events);
        Some(Verdict::Approved)
    }

    fn refuse(&self, anchor: AnchorId, reason: Rejection, events: &mut EventBus) -> Verdict {
        debug!("{} refused by {}: {}", self.id, anchor, reason);
        events.push(InteractionEvent::Rejected {
            object: self.id,
            anchor: Some(anchor),
            reason: reason.clone(),
        });
        Verdict::Rejected(reason)
    }

    /// Step toward the origin. Lands exactly on it and goes idle once within
    /// `epsilon`.
    pub(crate) fn advance_return(&mut self, dt: f32, speed: f32, epsilon: f32, events: &mut EventBus) {
        if self.state != InteractionState::Returning {
            return;
        }
        self.pose = self.pose.step_towards(&self.origin, speed * dt);
        if self.pose.distance(&self.origin) <= epsilon {
            self.pose = self.origin;
            self.transition(InteractionState::Idle, None, None, events);
        }
    }

    /// Back to idle at the origin from any state. An object that is already
    /// idle and unlinked is left alone and `false` returned.
    pub(crate) fn force_release(&mut self, anchors: &mut AnchorSet, events: &mut EventBus) -> bool {
        if self.state == InteractionState::Idle && self.holder.is_none() && self.attached_to.is_none() {
            return false;
        }
        let was = self.state;
        let vacated = self.leave_anchor(anchors);
        let grabber = self.holder.take();
        self.restore_physics();
        self.parent = Parent::World;
        self.pose = self.origin;
        if was != InteractionState::Idle {
            self.transition(InteractionState::Idle, vacated, grabber, events);
        }
        true
    }

    /// Put the object back on its origin pose without touching its state
    pub(crate) fn snap_home(&mut self) {
        self.pose = self.origin;
    }

    /// The anchor this object points at no longer holds it
    pub(crate) fn drop_stale_anchor(&mut self, events: &mut EventBus) {
        let Some(anchor) = self.attached_to.take() else {
            return;
        };
        warn!("{} '{}' lost its link to {}", self.id, self.name, anchor);
        if self.parent == Parent::Anchor(anchor) {
            self.parent = Parent::World;
        }
        if self.state == InteractionState::Attached {
            self.transition(InteractionState::Idle, Some(anchor), None, events);
        }
    }

    /// The grabber holding this object is gone or no longer holds it
    pub(crate) fn drop_stale_holder(&mut self, events: &mut EventBus, return_on_invalid: bool) {
        let Some(grabber) = self.holder.take() else {
            return;
        };
        warn!("{} '{}' lost its link to {}", self.id, self.name, grabber);
        self.restore_physics();
        self.parent = Parent::World;
        if self.state == InteractionState::Grabbed {
            let to = if return_on_invalid {
                InteractionState::Returning
            } else {
                InteractionState::Idle
            };
            self.transition(to, None, Some(grabber), events);
        }
    }

    fn snap_to(&mut self, anchor: &mut AnchorPoint, validator: &ConstraintValidator) -> Result<(), Rejection> {
        anchor.try_attach(self, validator)?;
        self.attached_to = Some(anchor.id());
        self.parent = Parent::Anchor(anchor.id());
        self.pose = anchor.pose();
        Ok(())
    }

    fn leave_anchor(&mut self, anchors: &mut AnchorSet) -> Option<AnchorId> {
        let anchor_id = self.attached_to.take()?;
        match anchors.get_mut(anchor_id) {
            Some(anchor) => {
                if !anchor.detach_if(self.id) {
                    warn!(
                        "{} expected to occupy {} but found {:?}",
                        self.id,
                        anchor_id,
                        anchor.current_occupant()
                    );
                }
            }
            None => warn!("{} was attached to missing {}", self.id, anchor_id),
        }
        if self.parent == Parent::Anchor(anchor_id) {
            self.parent = Parent::World;
        }
        Some(anchor_id)
    }

    fn restore_physics(&mut self) {
        if let Some(saved) = self.saved_physics.take() {
            self.physics = saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Rig;
    use skillbench_config::AnchorSpec;

    const HAND: GrabberId = GrabberId::new(0);

    fn wire_at(position: Point3D, category: Category, capacity: u32) -> Interactable {
        Interactable::new(
            InteractableId::new(1),
            InteractableSpec::new("wire", Pose::from_position(position))
                .with_category(category)
                .with_capacity(capacity),
        )
    }

    fn carry_to(object: &mut Interactable, position: Point3D) {
        object.follow(position, Quaternion::IDENTITY);
    }

    #[test]
    fn test_hover_only_from_idle() {
        let mut rig = Rig::default();
        let mut object = wire_at(Point3D::ORIGIN, Category::Hot, 15);

        object.set_hovered(true, &mut rig.events);
        assert_eq!(object.state(), InteractionState::Hovered);
        object.set_hovered(true, &mut rig.events);
        object.set_hovered(false, &mut rig.events);
        assert_eq!(object.state(), InteractionState::Idle);
        assert_eq!(rig.events.flush().len(), 2);
    }

    #[test]
    fn test_grab_disables_physics_and_release_restores() {
        let mut rig = Rig::default();
        let mut object = wire_at(Point3D::ORIGIN, Category::Hot, 15);

        object.begin_grab(HAND, &mut rig.links()).unwrap();
        assert_eq!(object.state(), InteractionState::Grabbed);
        assert_eq!(object.physics(), PhysicsFlags::KINEMATIC);
        assert_eq!(object.parent(), Parent::Grabber(HAND));

        object.release(&mut rig.links(), true);
        assert_eq!(object.physics(), PhysicsFlags::DYNAMIC);
        assert_eq!(object.parent(), Parent::World);
        assert_eq!(object.holder(), None);
    }

    #[test]
    fn test_second_grab_refused() {
        let mut rig = Rig::default();
        let mut object = wire_at(Point3D::ORIGIN, Category::Hot, 15);
        object.begin_grab(HAND, &mut rig.links()).unwrap();
        let refusal = object.begin_grab(GrabberId::new(1), &mut rig.links()).unwrap_err();
        assert_eq!(refusal, GrabRefusal::HeldBy(HAND));
        assert_eq!(object.holder(), Some(HAND));
    }

    #[test]
    fn test_fixed_object_never_hovers_or_grabs() {
        let mut rig = Rig::default();
        let mut object = Interactable::new(
            InteractableId::new(0),
            InteractableSpec::new("panel", Pose::IDENTITY).fixed(),
        );
        object.set_hovered(true, &mut rig.events);
        assert_eq!(object.state(), InteractionState::Idle);
        assert_eq!(
            object.begin_grab(HAND, &mut rig.links()),
            Err(GrabRefusal::NotGrabbable)
        );
    }

    #[test]
    fn test_follow_applies_grip_offset() {
        let mut rig = Rig::default();
        let mut object = Interactable::new(
            InteractableId::new(0),
            InteractableSpec::new("tape", Pose::IDENTITY)
                .with_grip_offset(Pose::from_position(Point3D::new(0.0, 0.0, 0.1))),
        );
        object.follow(Point3D::new(1.0, 0.0, 0.0), Quaternion::IDENTITY);
        assert_eq!(object.pose(), Pose::IDENTITY, "idle objects ignore follow");

        object.begin_grab(HAND, &mut rig.links()).unwrap();
        let yaw = Quaternion::from_euler_degrees(90.0, 0.0, 0.0);
        object.follow(Point3D::new(1.0, 0.0, 0.0), yaw);
        assert!(object.pose().position.approx_eq(&Point3D::new(1.1, 0.0, 0.0), 1e-4));
        assert!(object.pose().rotation.angle_to(&yaw) < 1e-4);
    }

    #[test]
    fn test_release_in_reach_attaches_and_snaps() {
        let mut rig = Rig::default();
        let bar = rig.anchor(
            AnchorSpec::new("ground_bar", Point3D::new(0.0, 1.0, 0.5)).accepting(Category::Ground),
        );
        let mut object = wire_at(Point3D::ORIGIN, Category::Ground, 20);

        object.begin_grab(HAND, &mut rig.links()).unwrap();
        carry_to(&mut object, Point3D::new(0.02, 1.0, 0.5));
        let outcome = object.release(&mut rig.links(), true);

        assert_eq!(outcome, ReleaseOutcome::Attached(bar));
        assert_eq!(object.state(), InteractionState::Attached);
        assert_eq!(object.attached_to(), Some(bar));
        assert_eq!(object.parent(), Parent::Anchor(bar));
        assert_eq!(object.pose().position, Point3D::new(0.0, 1.0, 0.5));
        assert_eq!(rig.anchors.get(bar).unwrap().current_occupant(), Some(object.id()));
    }

    #[test]
    fn test_wrong_category_returns_home() {
        let mut rig = Rig::default();
        let bar = rig.anchor(AnchorSpec::new("bar", Point3D::new(0.0, 1.0, 0.5)).accepting(Category::Ground));
        let mut object = wire_at(Point3D::ORIGIN, Category::Hot, 20);

        object.begin_grab(HAND, &mut rig.links()).unwrap();
        carry_to(&mut object, Point3D::new(0.0, 1.0, 0.5));
        let outcome = object.release(&mut rig.links(), true);

        assert!(matches!(
            outcome,
            ReleaseOutcome::Returning(Some(Rejection::TypeMismatch { .. }))
        ));
        assert_eq!(object.state(), InteractionState::Returning);
        assert!(!rig.anchors.get(bar).unwrap().is_occupied());

        let events = rig.events.flush();
        assert!(events.iter().any(|e| matches!(
            e,
            InteractionEvent::Rejected { anchor: Some(a), .. } if *a == bar
        )));
    }

    #[test]
    fn test_release_prefers_accepting_anchor_over_nearer_one() {
        let mut rig = Rig::default();
        let bar = rig.anchor(AnchorSpec::new("bar", Point3D::new(0.0, 1.0, 0.5)).accepting(Category::Ground));
        let breaker = rig.anchor(AnchorSpec::new("breaker", Point3D::new(0.03, 1.0, 0.5)).accepting(Category::Hot));
        let mut object = wire_at(Point3D::ORIGIN, Category::Hot, 20);

        object.begin_grab(HAND, &mut rig.links()).unwrap();
        carry_to(&mut object, Point3D::new(0.01, 1.0, 0.5));
        rig.events.flush();

        assert_eq!(object.release(&mut rig.links(), true), ReleaseOutcome::Attached(breaker));
        assert!(!rig.anchors.get(bar).unwrap().is_occupied());
        assert!(!rig.events.flush().iter().any(InteractionEvent::is_rejection));
    }

    #[test]
    fn test_return_policy_off_drops_in_place() {
        let mut rig = Rig::default();
        let mut object = wire_at(Point3D::ORIGIN, Category::Hot, 20);
        object.begin_grab(HAND, &mut rig.links()).unwrap();
        carry_to(&mut object, Point3D::new(2.0, 0.0, 0.0));

        assert_eq!(object.release(&mut rig.links(), false), ReleaseOutcome::Dropped(None));
        assert_eq!(object.state(), InteractionState::Idle);
        assert_eq!(object.pose().position, Point3D::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_release_over_occupied_anchor_reports_occupied() {
        let mut rig = Rig::default();
        let lug = rig.anchor(AnchorSpec::new("lug", Point3D::ORIGIN));
        let mut first = wire_at(Point3D::new(1.0, 0.0, 0.0), Category::Hot, 20);
        let mut second = Interactable::new(
            InteractableId::new(2),
            InteractableSpec::new("second", Pose::from_position(Point3D::new(2.0, 0.0, 0.0))),
        );

        first.begin_grab(HAND, &mut rig.links()).unwrap();
        carry_to(&mut first, Point3D::ORIGIN);
        first.release(&mut rig.links(), true);

        second.begin_grab(HAND, &mut rig.links()).unwrap();
        carry_to(&mut second, Point3D::new(0.01, 0.0, 0.0));
        let outcome = second.release(&mut rig.links(), true);
        assert_eq!(
            outcome.rejection(),
            Some(&Rejection::Occupied {
                anchor: lug,
                occupant: first.id()
            })
        );
        assert_eq!(rig.anchors.get(lug).unwrap().current_occupant(), Some(first.id()));
    }

    #[test]
    fn test_regrab_detaches() {
        let mut rig = Rig::default();
        let lug = rig.anchor(AnchorSpec::new("lug", Point3D::ORIGIN));
        let mut object = wire_at(Point3D::new(1.0, 0.0, 0.0), Category::Hot, 20);
        object.begin_grab(HAND, &mut rig.links()).unwrap();
        carry_to(&mut object, Point3D::ORIGIN);
        object.release(&mut rig.links(), true);
        rig.events.flush();

        object.begin_grab(HAND, &mut rig.links()).unwrap();
        assert_eq!(object.attached_to(), None);
        assert!(!rig.anchors.get(lug).unwrap().is_occupied());

        let events = rig.events.flush();
        assert_eq!(
            events,
            vec![InteractionEvent::StateChanged {
                object: object.id(),
                from: InteractionState::Attached,
                to: InteractionState::Grabbed,
                anchor: Some(lug),
                grabber: Some(HAND),
            }]
        );
    }

    #[test]
    fn test_returning_converges_exactly() {
        let mut rig = Rig::default();
        let origin = Pose::new(Point3D::new(0.5, 1.0, 0.0), Quaternion::from_euler_degrees(0.0, 0.0, 90.0));
        let mut object = Interactable::new(InteractableId::new(0), InteractableSpec::new("w", origin));

        object.begin_grab(HAND, &mut rig.links()).unwrap();
        object.follow(Point3D::new(1.5, 1.0, 0.0), Quaternion::IDENTITY);
        object.release(&mut rig.links(), true);
        assert_eq!(object.state(), InteractionState::Returning);
        assert_eq!(object.begin_grab(HAND, &mut rig.links()), Err(GrabRefusal::Returning));

        let mut last = object.pose().distance(&origin);
        for _ in 0..200 {
            object.advance_return(1.0 / 60.0, 2.0, 1e-3, &mut rig.events);
            let now = object.pose().distance(&origin);
            assert!(now <= last);
            last = now;
            if object.state() == InteractionState::Idle {
                break;
            }
        }
        assert_eq!(object.state(), InteractionState::Idle);
        assert_eq!(object.pose(), origin);
    }

    #[test]
    fn test_place_validates_without_side_effects() {
        let mut rig = Rig::default();
        let hot = rig.anchor(AnchorSpec::new("hot", Point3D::ORIGIN).accepting(Category::Hot));
        let ground = rig.anchor(AnchorSpec::new("ground", Point3D::new(1.0, 0.0, 0.0)).accepting(Category::Ground));
        let mut object = wire_at(Point3D::new(3.0, 0.0, 0.0), Category::Hot, 20);

        assert!(object.place(hot, &mut rig.links()).unwrap().is_approved());
        assert_eq!(object.attached_to(), Some(hot));

        let verdict = object.place(ground, &mut rig.links()).unwrap();
        assert!(!verdict.is_approved());
        assert_eq!(object.attached_to(), Some(hot), "a refused move keeps the old anchor");
        assert_eq!(rig.anchors.get(hot).unwrap().current_occupant(), Some(object.id()));
    }

    #[test]
    fn test_force_release_from_attached() {
        let mut rig = Rig::default();
        let lug = rig.anchor(AnchorSpec::new("lug", Point3D::ORIGIN));
        let mut object = wire_at(Point3D::new(1.0, 0.0, 0.0), Category::Hot, 20);
        object.place(lug, &mut rig.links()).unwrap();

        assert!(object.force_release(&mut rig.anchors, &mut rig.events));
        assert_eq!(object.state(), InteractionState::Idle);
        assert_eq!(object.pose(), object.origin());
        assert!(!rig.anchors.get(lug).unwrap().is_occupied());
        assert!(!object.force_release(&mut rig.anchors, &mut rig.events));
    }

    #[test]
    fn test_stale_holder_falls_back() {
        let mut rig = Rig::default();
        let mut object = wire_at(Point3D::ORIGIN, Category::Hot, 20);
        object.begin_grab(HAND, &mut rig.links()).unwrap();
        object.drop_stale_holder(&mut rig.events, true);
        assert_eq!(object.state(), InteractionState::Returning);
        assert_eq!(object.holder(), None);
        assert_eq!(object.physics(), PhysicsFlags::DYNAMIC);
    }
}
