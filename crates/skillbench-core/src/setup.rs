//! Building a world from a task file

use std::collections::HashMap;

use skillbench_config::{CatalogEntry, ConfigError, EngineSettings, ObjectSpec, TaskBundle};
use skillbench_input::TrackingSource;
use tracing::info;

use crate::error::{EngineError, Result};
use crate::ids::{AnchorId, GrabberId, InteractableId, PrepTargetId};
use crate::interactable::{InteractableSpec, ToolProfile};
use crate::tools::PrepTarget;
use crate::world::InteractionWorld;

/// Interactable spec for one task object, filling gaps from its catalog entry
pub fn spec_for(object: &ObjectSpec, entry: &CatalogEntry, settings: &EngineSettings) -> InteractableSpec {
    let mut spec = InteractableSpec::new(object.name.clone(), object.origin.to_pose())
        .with_kind(object.kind.clone())
        .with_capacity(object.capacity.unwrap_or(entry.capacity))
        .with_grip_offset(entry.grip_offset.to_pose())
        .with_grab_radius(entry.grab_radius.unwrap_or(settings.default_grab_radius));
    if let Some(category) = object.category.or(entry.category) {
        spec = spec.with_category(category);
    }
    if let Some(bounds) = entry.bounds {
        spec = spec.with_bounds(bounds);
    }
    if let Some(tip_offset) = entry.tip_offset {
        spec = spec.with_tool(ToolProfile {
            tip_offset,
            activation_distance: entry
                .activation_distance
                .unwrap_or(ToolProfile::DEFAULT_ACTIVATION_DISTANCE),
        });
    }
    if !entry.grabbable {
        spec = spec.fixed();
    }
    spec
}

/// A world set up from a [`TaskBundle`], with its names resolved to handles
#[derive(Debug)]
pub struct TaskSession {
    name: String,
    world: InteractionWorld,
    anchors: HashMap<String, AnchorId>,
    objects: HashMap<String, InteractableId>,
    prep_targets: HashMap<String, PrepTargetId>,
}

impl TaskSession {
    pub fn from_bundle(bundle: &TaskBundle) -> Result<Self> {
        bundle.validate()?;
        let mut world = InteractionWorld::new(bundle.settings.clone())?;

        let mut anchors = HashMap::new();
        for spec in &bundle.task.anchors {
            anchors.insert(spec.name.clone(), world.add_anchor(spec));
        }

        let mut objects = HashMap::new();
        for object in &bundle.task.objects {
            let entry = bundle
                .catalog
                .get(&object.kind)
                .ok_or_else(|| ConfigError::UnknownKind {
                    object: object.name.clone(),
                    kind: object.kind.clone(),
                })?;
            let id = world.spawn(spec_for(object, entry, &bundle.settings));
            objects.insert(object.name.clone(), id);
        }

        let mut prep_targets = HashMap::new();
        for target in &bundle.task.prep_targets {
            let id = world.add_prep_target(
                PrepTarget::new(target.name.clone(), target.work_point).with_prepared(target.prepared),
            );
            prep_targets.insert(target.name.clone(), id);
        }

        info!(
            "Task '{}' ready: {} anchors, {} objects, {} prep targets",
            bundle.task.name,
            anchors.len(),
            objects.len(),
            prep_targets.len()
        );
        Ok(Self {
            name: bundle.task.name.clone(),
            world,
            anchors,
            objects,
            prep_targets,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &InteractionWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut InteractionWorld {
        &mut self.world
    }

    pub fn into_world(self) -> InteractionWorld {
        self.world
    }

    pub fn add_hand(&mut self, name: impl Into<String>, source: Box<dyn TrackingSource>) -> GrabberId {
        self.world.add_grabber(name, source)
    }

    pub fn anchor_id(&self, name: &str) -> Result<AnchorId> {
        lookup(&self.anchors, "anchor", name)
    }

    pub fn object_id(&self, name: &str) -> Result<InteractableId> {
        lookup(&self.objects, "object", name)
    }

    pub fn prep_target_id(&self, name: &str) -> Result<PrepTargetId> {
        lookup(&self.prep_targets, "prep target", name)
    }

    /// Every anchor filled and every prep target prepared
    pub fn is_complete(&mut self) -> bool {
        self.world.all_anchors_occupied() && self.world.prep_targets().all(|(_, target)| target.is_prepared())
    }
}

fn lookup<T: Copy>(table: &HashMap<String, T>, kind: &'static str, name: &str) -> Result<T> {
    table.get(name).copied().ok_or_else(|| EngineError::UnknownName {
        kind,
        name: name.to_string(),
    })
}
