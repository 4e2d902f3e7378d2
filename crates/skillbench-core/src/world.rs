//! The interaction world and its tick
//!
//! Each call to [`InteractionWorld::tick`] runs the same fixed pipeline:
//!
//! 1. repair links left dangling by removals
//! 2. input sampling: every grabber polls its source once
//! 3. transitions: grabs and releases, in grabber registration order
//! 4. pose application: hover, held objects follow, returning objects fly home
//! 5. notifications: queued events go to observers in one batch
//!
//! Everything runs on the caller's thread. Commands issued between ticks
//! ([`InteractionWorld::place`], [`InteractionWorld::force_release`], ...) notify
//! observers before they return.

use std::collections::BTreeMap;

use skillbench_config::{AnchorSpec, EngineSettings};
use skillbench_input::TrackingSource;
use skillbench_spatial::{Point3D, Pose};
use tracing::{debug, info, warn};

use crate::anchor::{AnchorPoint, AnchorSet};
use crate::error::{EngineError, Result};
use crate::events::{EventBus, InteractionEvent, InteractionObserver, TickReport};
use crate::grabber::{GrabIntent, Grabber};
use crate::ids::{AnchorId, Counter, GrabberId, InteractableId, PrepTargetId};
use crate::interactable::{Interactable, InteractableSpec, InteractionState, Links, ReleaseOutcome};
use crate::proximity::{index_for, nearest_of};
use crate::tools::{Measurement, MeasuringTape, PrepTarget, SurfacePrep, SurfacePrepTool};
use crate::validator::{ConstraintValidator, Verdict};

#[derive(Debug)]
pub struct InteractionWorld {
    settings: EngineSettings,
    validator: ConstraintValidator,
    anchors: AnchorSet,
    objects: BTreeMap<InteractableId, Interactable>,
    grabbers: BTreeMap<GrabberId, Grabber>,
    prep_targets: BTreeMap<PrepTargetId, PrepTarget>,
    events: EventBus,
    object_ids: Counter,
    grabber_ids: Counter,
    prep_ids: Counter,
    tick: u64,
}

impl Default for InteractionWorld {
    fn default() -> Self {
        Self::with_settings(EngineSettings::default())
    }
}

impl InteractionWorld {
    /// Empty world running under `settings`, which are validated first
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::with_settings(settings))
    }

    fn with_settings(settings: EngineSettings) -> Self {
        let anchors = AnchorSet::with_index(index_for(&settings.index));
        Self {
            settings,
            validator: ConstraintValidator,
            anchors,
            objects: BTreeMap::new(),
            grabbers: BTreeMap::new(),
            prep_targets: BTreeMap::new(),
            events: EventBus::default(),
            object_ids: Counter::default(),
            grabber_ids: Counter::default(),
            prep_ids: Counter::default(),
            tick: 0,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    // ---- registration ----

    pub fn add_anchor(&mut self, spec: &AnchorSpec) -> AnchorId {
        let id = self.anchors.register(spec);
        debug!("Registered {} '{}' accepting {}", id, spec.name, spec.accepts);
        id
    }

    pub fn spawn(&mut self, spec: InteractableSpec) -> InteractableId {
        let id = InteractableId::new(self.object_ids.next());
        debug!("Spawned {} '{}'", id, spec.name);
        self.objects.insert(id, Interactable::new(id, spec));
        id
    }

    pub fn add_grabber(&mut self, name: impl Into<String>, source: Box<dyn TrackingSource>) -> GrabberId {
        let id = GrabberId::new(self.grabber_ids.next());
        let grabber = Grabber::new(id, name, source, &self.settings.grabber);
        debug!("Added {} '{}'", id, grabber.name());
        self.grabbers.insert(id, grabber);
        id
    }

    pub fn add_prep_target(&mut self, target: PrepTarget) -> PrepTargetId {
        let id = PrepTargetId::new(self.prep_ids.next());
        self.prep_targets.insert(id, target);
        id
    }

    pub fn subscribe(&mut self, observer: impl InteractionObserver + 'static) {
        self.events.subscribe(Box::new(observer));
    }

    /// Remove an anchor. An object attached to it is released on the next tick.
    pub fn remove_anchor(&mut self, id: AnchorId) -> Option<AnchorPoint> {
        self.anchors.remove(id)
    }

    /// Remove an interactable. Anchors and grabbers pointing at it are cleared on
    /// the next tick.
    pub fn despawn(&mut self, id: InteractableId) -> Option<Interactable> {
        self.objects.remove(&id)
    }

    /// Remove a grabber. Whatever it held falls back on the next tick.
    pub fn remove_grabber(&mut self, id: GrabberId) -> bool {
        self.grabbers.remove(&id).is_some()
    }

    // ---- queries ----

    pub fn anchors(&self) -> &AnchorSet {
        &self.anchors
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&AnchorPoint> {
        self.anchors.get(id)
    }

    pub fn object(&self, id: InteractableId) -> Option<&Interactable> {
        self.objects.get(&id)
    }

    /// Interactables in spawn order
    pub fn objects(&self) -> impl Iterator<Item = &Interactable> {
        self.objects.values()
    }

    pub fn grabber(&self, id: GrabberId) -> Option<&Grabber> {
        self.grabbers.get(&id)
    }

    pub fn grabbers(&self) -> impl Iterator<Item = &Grabber> {
        self.grabbers.values()
    }

    pub fn prep_target(&self, id: PrepTargetId) -> Option<&PrepTarget> {
        self.prep_targets.get(&id)
    }

    pub fn prep_targets(&self) -> impl Iterator<Item = (PrepTargetId, &PrepTarget)> {
        self.prep_targets.iter().map(|(id, target)| (*id, target))
    }

    fn expect_object(&self, id: InteractableId) -> Result<&Interactable> {
        self.objects.get(&id).ok_or(EngineError::UnknownInteractable(id))
    }

    pub fn state_of(&self, id: InteractableId) -> Result<InteractionState> {
        self.expect_object(id).map(Interactable::state)
    }

    pub fn pose_of(&self, id: InteractableId) -> Result<Pose> {
        self.expect_object(id).map(Interactable::pose)
    }

    pub fn holder_of(&self, id: InteractableId) -> Result<Option<GrabberId>> {
        self.expect_object(id).map(Interactable::holder)
    }

    pub fn is_occupied(&mut self, anchor: AnchorId) -> Result<bool> {
        self.current_occupant(anchor).map(|occupant| occupant.is_some())
    }

    /// Who sits on `anchor`. A dangling occupant is cleared before answering.
    pub fn current_occupant(&mut self, anchor: AnchorId) -> Result<Option<InteractableId>> {
        let point = self.anchors.get_mut(anchor).ok_or(EngineError::UnknownAnchor(anchor))?;
        if let Some(occupant) = point.current_occupant() {
            let linked = self
                .objects
                .get(&occupant)
                .is_some_and(|object| object.attached_to() == Some(anchor));
            if !linked {
                warn!("{} '{}' held stale occupant {}; clearing", anchor, point.name(), occupant);
                point.detach();
            }
        }
        Ok(point.current_occupant())
    }

    /// Every anchor filled. Vacuously true for a world without anchors.
    /// Repairs made on the way are reported with the next tick.
    pub fn all_anchors_occupied(&mut self) -> bool {
        self.sweep_stale_links();
        self.anchors.all_occupied()
    }

    /// Every link inconsistency in the world, described. Empty when the
    /// holder/occupant/state invariants all hold.
    pub fn verify_links(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for anchor in self.anchors.iter() {
            if let Some(occupant) = anchor.current_occupant() {
                match self.objects.get(&occupant) {
                    Some(object) if object.attached_to() == Some(anchor.id()) => {}
                    Some(object) => problems.push(format!(
                        "{} holds {} but it is attached to {:?}",
                        anchor.id(),
                        occupant,
                        object.attached_to()
                    )),
                    None => problems.push(format!("{} holds missing {}", anchor.id(), occupant)),
                }
            }
        }
        for object in self.objects.values() {
            let id = object.id();
            if object.holder().is_some() && object.attached_to().is_some() {
                problems.push(format!("{id} is both held and attached"));
            }
            if (object.state() == InteractionState::Grabbed) != object.holder().is_some() {
                problems.push(format!("{id} is {} with holder {:?}", object.state(), object.holder()));
            }
            if (object.state() == InteractionState::Attached) != object.attached_to().is_some() {
                problems.push(format!(
                    "{id} is {} with anchor {:?}",
                    object.state(),
                    object.attached_to()
                ));
            }
            if let Some(anchor) = object.attached_to() {
                if self.anchors.get(anchor).and_then(AnchorPoint::current_occupant) != Some(id) {
                    problems.push(format!("{id} claims {anchor} which does not hold it"));
                }
            }
            if let Some(holder) = object.holder() {
                if self.grabbers.get(&holder).and_then(Grabber::held) != Some(id) {
                    problems.push(format!("{id} claims {holder} which does not hold it"));
                }
            }
        }
        for grabber in self.grabbers.values() {
            if let Some(held) = grabber.held() {
                if self.objects.get(&held).and_then(Interactable::holder) != Some(grabber.id()) {
                    problems.push(format!("{} claims {} which it does not hold", grabber.id(), held));
                }
            }
        }
        problems
    }

    // ---- commands ----

    /// Grab `object` with `grabber` directly, bypassing intent detection
    pub fn grab(&mut self, grabber: GrabberId, object: InteractableId) -> Result<()> {
        let hand = self.grabbers.get(&grabber).ok_or(EngineError::UnknownGrabber(grabber))?;
        if let Some(held) = hand.held() {
            return Err(EngineError::HandFull { grabber, held });
        }
        self.expect_object(object)?;
        let result = self.grab_with(grabber, object);
        self.events.flush();
        result
    }

    /// Release whatever `grabber` holds, as if its intent had dropped
    pub fn release(&mut self, grabber: GrabberId) -> Result<ReleaseOutcome> {
        if !self.grabbers.contains_key(&grabber) {
            return Err(EngineError::UnknownGrabber(grabber));
        }
        let outcome = self.release_from(grabber);
        self.events.flush();
        Ok(outcome)
    }

    /// Attach an object that nobody holds straight onto an anchor
    pub fn place(&mut self, object: InteractableId, anchor: AnchorId) -> Result<Verdict> {
        let item = self
            .objects
            .get_mut(&object)
            .ok_or(EngineError::UnknownInteractable(object))?;
        if let Some(holder) = item.holder() {
            return Err(EngineError::Held { object, holder });
        }
        let mut links = Links {
            anchors: &mut self.anchors,
            validator: &self.validator,
            events: &mut self.events,
        };
        let verdict = item
            .place(anchor, &mut links)
            .ok_or(EngineError::UnknownAnchor(anchor))?;
        self.events.flush();
        Ok(verdict)
    }

    /// Drop everything and put `object` back at its origin. `false`, with no
    /// events, if it was already idle and unlinked (wherever it was dropped).
    pub fn force_release(&mut self, object: InteractableId) -> Result<bool> {
        let item = self
            .objects
            .get_mut(&object)
            .ok_or(EngineError::UnknownInteractable(object))?;
        let holder = item.holder();
        let changed = item.force_release(&mut self.anchors, &mut self.events);
        if let Some(grabber) = holder.and_then(|id| self.grabbers.get_mut(&id)) {
            grabber.set_held(None);
        }
        self.events.flush();
        Ok(changed)
    }

    /// Every object back to its origin, every anchor empty, every prep target as
    /// it started
    pub fn reset_task(&mut self) {
        self.sweep_stale_links();
        for object in self.objects.values_mut() {
            object.force_release(&mut self.anchors, &mut self.events);
            object.snap_home();
        }
        for grabber in self.grabbers.values_mut() {
            grabber.set_held(None);
        }
        for target in self.prep_targets.values_mut() {
            target.reset();
        }
        info!("Task reset ({} objects)", self.objects.len());
        self.events.flush();
    }

    /// World-space tip of a tool
    pub fn tool_tip(&self, tool: InteractableId) -> Result<Point3D> {
        self.expect_object(tool)?
            .tool_tip()
            .ok_or(EngineError::NotATool(tool))
    }

    /// Apply a preparation tool to `target`. The verdict is also delivered to
    /// observers as [`InteractionEvent::ToolUsed`].
    pub fn prepare_with(&mut self, tool: InteractableId, target: PrepTargetId) -> Result<Verdict> {
        let object = self.expect_object(tool)?;
        let (Some(profile), Some(tip)) = (object.tool(), object.tool_tip()) else {
            return Err(EngineError::NotATool(tool));
        };
        let instrument = SurfacePrepTool {
            tip,
            activation_distance: profile.activation_distance,
        };
        let surface = self
            .prep_targets
            .get_mut(&target)
            .ok_or(EngineError::UnknownPrepTarget(target))?;

        let verdict = SurfacePrep.apply(&instrument, surface);
        match &verdict {
            Verdict::Approved => info!("{} prepared '{}'", tool, surface.name()),
            Verdict::Rejected(reason) => debug!("{} on '{}': {}", tool, surface.name(), reason),
        }
        self.events.push(InteractionEvent::ToolUsed {
            tool,
            target,
            verdict: verdict.clone(),
        });
        self.events.flush();
        Ok(verdict)
    }

    /// Read `tape` against an object: its tool tip if it has one, otherwise its
    /// position
    pub fn measure(&self, tape: &MeasuringTape, object: InteractableId) -> Result<Option<Measurement>> {
        let item = self.expect_object(object)?;
        let body = item.tool_tip().unwrap_or(item.pose().position);
        Ok(tape.read(body))
    }

    // ---- the tick ----

    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.tick += 1;
        self.sweep_stale_links();

        let intents: Vec<(GrabberId, GrabIntent)> = self
            .grabbers
            .values_mut()
            .filter_map(|grabber| grabber.sample().map(|intent| (grabber.id(), intent)))
            .collect();

        // Grab targets are resolved against the world as it stood before this
        // tick's grabs, so two hands reaching for one object contend for it.
        let targets: BTreeMap<GrabberId, InteractableId> = intents
            .iter()
            .filter(|(_, intent)| *intent == GrabIntent::Grab)
            .filter_map(|(id, _)| {
                let grabber = self.grabbers.get(id)?;
                if grabber.held().is_some() {
                    return None;
                }
                self.grab_candidate(grabber).map(|object| (*id, object))
            })
            .collect();

        for (grabber, intent) in intents {
            match intent {
                GrabIntent::Release => {
                    self.release_from(grabber);
                }
                GrabIntent::Grab => match targets.get(&grabber) {
                    Some(&object) => {
                        if let Err(err) = self.grab_with(grabber, object) {
                            debug!("{} lost {} this tick: {}", grabber, object, err);
                        }
                    }
                    None => debug!("{} closed on nothing", grabber),
                },
            }
        }

        self.update_hover();
        self.apply_poses(dt);

        TickReport {
            tick: self.tick,
            events: self.events.flush(),
        }
    }

    /// Nearest grabbable object within near-field reach, else the first one the
    /// pointer hits within range
    fn grab_candidate(&self, grabber: &Grabber) -> Option<InteractableId> {
        let reference = grabber.reference_point();
        let reach = grabber.grab_radius() * grabber.grab_radius();
        let near = nearest_of(
            self.objects
                .values()
                .filter(|object| object.can_be_grabbed())
                .map(|object| (object.id(), object.pose().position.distance_squared(&reference)))
                .filter(|(_, dist_sq)| *dist_sq <= reach),
        );
        if let Some((id, _)) = near {
            return Some(id);
        }

        let ray = grabber.pointer();
        nearest_of(
            self.objects
                .values()
                .filter(|object| object.can_be_grabbed())
                .filter_map(|object| {
                    object
                        .pickup_bounds()
                        .ray_hit(&object.pose(), &ray)
                        .filter(|t| *t <= grabber.pointer_range())
                        .map(|t| (object.id(), t))
                }),
        )
        .map(|(id, _)| id)
    }

    fn grab_with(&mut self, grabber: GrabberId, object: InteractableId) -> Result<()> {
        let item = self
            .objects
            .get_mut(&object)
            .ok_or(EngineError::UnknownInteractable(object))?;
        let mut links = Links {
            anchors: &mut self.anchors,
            validator: &self.validator,
            events: &mut self.events,
        };
        item.begin_grab(grabber, &mut links)?;
        if let Some(hand) = self.grabbers.get_mut(&grabber) {
            hand.set_held(Some(object));
            item.follow(hand.reference_point(), hand.pose().rotation);
        }
        Ok(())
    }

    fn release_from(&mut self, grabber: GrabberId) -> ReleaseOutcome {
        let Some(hand) = self.grabbers.get_mut(&grabber) else {
            return ReleaseOutcome::NotHeld;
        };
        let Some(held) = hand.held() else {
            return ReleaseOutcome::NotHeld;
        };
        hand.set_held(None);
        let Some(item) = self.objects.get_mut(&held) else {
            return ReleaseOutcome::NotHeld;
        };

        item.follow(hand.reference_point(), hand.pose().rotation);
        let mut links = Links {
            anchors: &mut self.anchors,
            validator: &self.validator,
            events: &mut self.events,
        };
        let outcome = item.release(&mut links, self.settings.return_on_invalid_release);
        match &outcome {
            ReleaseOutcome::Attached(anchor) => info!("{} '{}' attached to {}", held, item.name(), anchor),
            other => debug!("{} released {}: {:?}", grabber, held, other),
        }
        outcome
    }

    fn update_hover(&mut self) {
        let hands: Vec<Point3D> = self
            .grabbers
            .values()
            .filter(|grabber| grabber.held().is_none())
            .map(Grabber::reference_point)
            .collect();
        for object in self.objects.values_mut() {
            let reach = object.grab_radius() * object.grab_radius();
            let position = object.pose().position;
            let hovered = object.can_be_grabbed()
                && hands.iter().any(|hand| hand.distance_squared(&position) <= reach);
            object.set_hovered(hovered, &mut self.events);
        }
    }

    fn apply_poses(&mut self, dt: f32) {
        for grabber in self.grabbers.values() {
            if let Some(object) = grabber.held().and_then(|id| self.objects.get_mut(&id)) {
                object.follow(grabber.reference_point(), grabber.pose().rotation);
            }
        }
        let speed = self.settings.return_speed;
        let epsilon = self.settings.return_epsilon;
        for object in self.objects.values_mut() {
            object.advance_return(dt, speed, epsilon, &mut self.events);
        }
    }

    /// Tear down any holder/occupant relationship whose other end is gone
    fn sweep_stale_links(&mut self) {
        for anchor in self.anchors.iter_mut() {
            let Some(occupant) = anchor.current_occupant() else {
                continue;
            };
            let linked = self
                .objects
                .get(&occupant)
                .is_some_and(|object| object.attached_to() == Some(anchor.id()));
            if !linked {
                warn!("{} '{}' held stale occupant {}; clearing", anchor.id(), anchor.name(), occupant);
                anchor.detach();
            }
        }

        let return_home = self.settings.return_on_invalid_release;
        for object in self.objects.values_mut() {
            if let Some(anchor) = object.attached_to() {
                if self.anchors.get(anchor).and_then(AnchorPoint::current_occupant) != Some(object.id()) {
                    object.drop_stale_anchor(&mut self.events);
                }
            }
            if let Some(holder) = object.holder() {
                if self.grabbers.get(&holder).and_then(Grabber::held) != Some(object.id()) {
                    object.drop_stale_holder(&mut self.events, return_home);
                }
            }
        }

        for grabber in self.grabbers.values_mut() {
            let Some(held) = grabber.held() else {
                continue;
            };
            if self.objects.get(&held).and_then(Interactable::holder) != Some(grabber.id()) {
                warn!("{} '{}' held stale {}; clearing", grabber.id(), grabber.name(), held);
                grabber.set_held(None);
            }
        }
    }
}
