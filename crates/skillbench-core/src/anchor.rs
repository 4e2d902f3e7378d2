//! Anchor points and the anchor registry

use std::collections::BTreeMap;

use skillbench_config::{AcceptFilter, AnchorSpec, Category};
use skillbench_spatial::{Point3D, Pose};

use crate::ids::{AnchorId, Counter, InteractableId};
use crate::interactable::Interactable;
use crate::proximity::{nearest_of, LinearIndex, ProximityIndex};
use crate::validator::{ConstraintValidator, Rejection, Validator};

/// A typed slot that holds at most one interactable
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPoint {
    id: AnchorId,
    name: String,
    pose: Pose,
    accepts: AcceptFilter,
    min_capacity: u32,
    snap_radius: f32,
    occupant: Option<InteractableId>,
}

impl AnchorPoint {
    pub fn from_spec(id: AnchorId, spec: &AnchorSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            pose: spec.pose.to_pose(),
            accepts: spec.accepts,
            min_capacity: spec.min_capacity,
            snap_radius: spec.snap_radius,
            occupant: None,
        }
    }

    pub fn id(&self) -> AnchorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pose an attached object snaps to
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn accepts(&self) -> AcceptFilter {
        self.accepts
    }

    pub fn min_capacity(&self) -> u32 {
        self.min_capacity
    }

    pub fn snap_radius(&self) -> f32 {
        self.snap_radius
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn current_occupant(&self) -> Option<InteractableId> {
        self.occupant
    }

    /// Whether `position` is inside this anchor's snap radius
    pub fn in_reach(&self, position: Point3D) -> bool {
        self.pose.position.distance_squared(&position) <= self.snap_radius * self.snap_radius
    }

    /// Occupy the slot if it is free and the validator approves. Either the
    /// occupant is set and `Ok` returned, or nothing changes.
    pub(crate) fn try_attach(
        &mut self,
        candidate: &Interactable,
        validator: &ConstraintValidator,
    ) -> Result<(), Rejection> {
        if let Some(occupant) = self.occupant {
            return Err(Rejection::Occupied {
                anchor: self.id,
                occupant,
            });
        }
        validator.evaluate(candidate, self).into_result()?;
        self.occupant = Some(candidate.id());
        Ok(())
    }

    /// Clear the occupant, returning who was there
    pub(crate) fn detach(&mut self) -> Option<InteractableId> {
        self.occupant.take()
    }

    /// Clear the occupant only if it is `expected`
    pub(crate) fn detach_if(&mut self, expected: InteractableId) -> bool {
        if self.occupant == Some(expected) {
            self.occupant = None;
            true
        } else {
            false
        }
    }
}

/// Restricts which anchors a nearest-anchor query may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnchorFilter {
    pub require_free: bool,
    pub category: Option<Category>,
}

impl AnchorFilter {
    /// Any anchor in reach
    pub fn any() -> Self {
        Self::default()
    }

    /// Unoccupied anchors only
    pub fn free() -> Self {
        Self {
            require_free: true,
            category: None,
        }
    }

    /// Anchors whose filter admits `category`
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn admits(&self, anchor: &AnchorPoint) -> bool {
        if self.require_free && anchor.is_occupied() {
            return false;
        }
        match self.category {
            Some(category) => anchor.accepts().accepts(category),
            None => true,
        }
    }
}

/// Registry of every anchor in a session, backed by a [`ProximityIndex`]
#[derive(Debug)]
pub struct AnchorSet {
    anchors: BTreeMap<AnchorId, AnchorPoint>,
    index: Box<dyn ProximityIndex>,
    ids: Counter,
    /// Largest snap radius in the set; the broad-phase query radius
    reach: f32,
}

impl Default for AnchorSet {
    fn default() -> Self {
        Self::with_index(Box::new(LinearIndex::default()))
    }
}

impl AnchorSet {
    pub fn with_index(index: Box<dyn ProximityIndex>) -> Self {
        Self {
            anchors: BTreeMap::new(),
            index,
            ids: Counter::default(),
            reach: 0.0,
        }
    }

    pub(crate) fn register(&mut self, spec: &AnchorSpec) -> AnchorId {
        let id = AnchorId::new(self.ids.next());
        let anchor = AnchorPoint::from_spec(id, spec);
        self.index.insert(id, anchor.pose.position);
        self.reach = self.reach.max(anchor.snap_radius);
        self.anchors.insert(id, anchor);
        id
    }

    pub(crate) fn remove(&mut self, id: AnchorId) -> Option<AnchorPoint> {
        let removed = self.anchors.remove(&id)?;
        self.index.remove(id);
        self.reach = self.anchors.values().map(|a| a.snap_radius).fold(0.0, f32::max);
        Some(removed)
    }

    pub fn get(&self, id: AnchorId) -> Option<&AnchorPoint> {
        self.anchors.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AnchorId) -> Option<&mut AnchorPoint> {
        self.anchors.get_mut(&id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AnchorPoint> {
        self.anchors.values_mut()
    }

    /// Anchors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &AnchorPoint> {
        self.anchors.values()
    }

    pub fn find(&self, name: &str) -> Option<&AnchorPoint> {
        self.anchors.values().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Nearest anchor whose snap radius contains `position` and that passes
    /// `filter`. Ties go to the earliest registered anchor.
    pub fn nearest(&self, position: Point3D, filter: &AnchorFilter) -> Option<AnchorId> {
        self.nearest_where(position, |anchor| filter.admits(anchor))
    }

    /// Like [`AnchorSet::nearest`] with an arbitrary predicate
    pub fn nearest_where(
        &self,
        position: Point3D,
        predicate: impl Fn(&AnchorPoint) -> bool,
    ) -> Option<AnchorId> {
        if self.anchors.is_empty() {
            return None;
        }
        let mut candidates = Vec::new();
        self.index.candidates_within(position, self.reach, &mut candidates);
        nearest_of(candidates.into_iter().filter(|(id, _)| {
            self.anchors
                .get(id)
                .is_some_and(|anchor| anchor.in_reach(position) && predicate(anchor))
        }))
        .map(|(id, _)| id)
    }

    pub fn all_occupied(&self) -> bool {
        self.anchors.values().all(AnchorPoint::is_occupied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::GridIndex;
    use crate::test_support::wire;

    fn two_lugs(set: &mut AnchorSet) -> (AnchorId, AnchorId) {
        let a = set.register(&AnchorSpec::new("a", Point3D::new(0.0, 1.0, 0.0)));
        let b = set.register(&AnchorSpec::new("b", Point3D::new(0.08, 1.0, 0.0)).with_snap_radius(0.1));
        (a, b)
    }

    #[test]
    fn test_try_attach_sets_occupant() {
        let mut set = AnchorSet::default();
        let (a, _) = two_lugs(&mut set);
        let object = wire(3, Some(Category::Hot), 15);

        let anchor = set.get_mut(a).unwrap();
        anchor.try_attach(&object, &ConstraintValidator).unwrap();
        assert!(anchor.is_occupied());
        assert_eq!(anchor.current_occupant(), Some(object.id()));
    }

    #[test]
    fn test_occupied_anchor_refuses_second_object() {
        let mut set = AnchorSet::default();
        let (a, _) = two_lugs(&mut set);
        let first = wire(0, None, 0);
        let second = wire(1, None, 0);

        let anchor = set.get_mut(a).unwrap();
        anchor.try_attach(&first, &ConstraintValidator).unwrap();
        let err = anchor.try_attach(&second, &ConstraintValidator).unwrap_err();
        assert_eq!(
            err,
            Rejection::Occupied {
                anchor: a,
                occupant: first.id()
            }
        );
        assert_eq!(anchor.current_occupant(), Some(first.id()));
    }

    #[test]
    fn test_rejected_attach_leaves_anchor_free() {
        let mut set = AnchorSet::default();
        let id = set.register(&AnchorSpec::new("bar", Point3D::ORIGIN).accepting(Category::Ground));
        let anchor = set.get_mut(id).unwrap();
        let result = anchor.try_attach(&wire(0, Some(Category::Hot), 20), &ConstraintValidator);
        assert!(matches!(result, Err(Rejection::TypeMismatch { .. })));
        assert!(!anchor.is_occupied());
    }

    #[test]
    fn test_detach() {
        let mut set = AnchorSet::default();
        let (a, _) = two_lugs(&mut set);
        let object = wire(0, None, 0);
        let anchor = set.get_mut(a).unwrap();
        anchor.try_attach(&object, &ConstraintValidator).unwrap();

        assert!(!anchor.detach_if(InteractableId::new(9)));
        assert!(anchor.is_occupied());
        assert_eq!(anchor.detach(), Some(object.id()));
        assert_eq!(anchor.detach(), None);
    }

    #[test]
    fn test_nearest_respects_per_anchor_snap_radius() {
        let mut set = AnchorSet::default();
        let (a, b) = two_lugs(&mut set);

        // 0.06 from a (radius 0.05) but 0.02 from b (radius 0.1)
        assert_eq!(set.nearest(Point3D::new(0.06, 1.0, 0.0), &AnchorFilter::any()), Some(b));
        // Inside both radii: nearest wins
        assert_eq!(set.nearest(Point3D::new(0.01, 1.0, 0.0), &AnchorFilter::any()), Some(a));
        assert_eq!(set.nearest(Point3D::new(-0.015, 1.0, 0.0), &AnchorFilter::any()), Some(a));
        assert_eq!(set.nearest(Point3D::new(-0.06, 1.0, 0.0), &AnchorFilter::any()), None);
    }

    #[test]
    fn test_nearest_free_skips_occupied() {
        let mut set = AnchorSet::with_index(Box::new(GridIndex::new(0.05)));
        let (a, b) = two_lugs(&mut set);
        set.get_mut(a)
            .unwrap()
            .try_attach(&wire(0, None, 0), &ConstraintValidator)
            .unwrap();

        let probe = Point3D::new(0.01, 1.0, 0.0);
        assert_eq!(set.nearest(probe, &AnchorFilter::any()), Some(a));
        assert_eq!(set.nearest(probe, &AnchorFilter::free()), Some(b));
    }

    #[test]
    fn test_category_filter() {
        let mut set = AnchorSet::default();
        let hot = set.register(&AnchorSpec::new("hot", Point3D::ORIGIN).accepting(Category::Hot));
        let any = set.register(&AnchorSpec::new("any", Point3D::new(0.03, 0.0, 0.0)));

        let filter = AnchorFilter::any().with_category(Category::Ground);
        assert_eq!(set.nearest(Point3D::ORIGIN, &filter), Some(any));
        let filter = AnchorFilter::any().with_category(Category::Hot);
        assert_eq!(set.nearest(Point3D::ORIGIN, &filter), Some(hot));
    }

    #[test]
    fn test_remove_shrinks_reach() {
        let mut set = AnchorSet::default();
        let (a, b) = two_lugs(&mut set);
        assert!(set.remove(b).is_some());
        assert!(set.remove(b).is_none());
        assert_eq!(set.len(), 1);
        assert_eq!(set.nearest(Point3D::new(0.06, 1.0, 0.0), &AnchorFilter::any()), None);
        assert_eq!(set.nearest(Point3D::new(0.0, 1.0, 0.0), &AnchorFilter::any()), Some(a));
    }
}
