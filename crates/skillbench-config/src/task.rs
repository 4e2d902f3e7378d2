//! Task definitions: which anchors exist and what is pre-placed

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use skillbench_spatial::{Point3D, Pose, Quaternion};

use crate::settings::positive;
use crate::{AcceptFilter, Catalog, Category, ConfigError, Result};

/// A pose as written in task files: position plus yaw/pitch/roll in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseSpec {
    #[serde(default)]
    pub position: Point3D,
    #[serde(default)]
    pub rotation_deg: [f32; 3],
}

impl PoseSpec {
    pub fn at(position: Point3D) -> Self {
        Self {
            position,
            rotation_deg: [0.0; 3],
        }
    }

    pub fn to_pose(&self) -> Pose {
        let [yaw, pitch, roll] = self.rotation_deg;
        let rotation = if self.rotation_deg == [0.0; 3] {
            Quaternion::IDENTITY
        } else {
            Quaternion::from_euler_degrees(yaw, pitch, roll)
        };
        Pose::new(self.position, rotation)
    }
}

impl From<PoseSpec> for Pose {
    fn from(spec: PoseSpec) -> Self {
        spec.to_pose()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSpec {
    pub name: String,
    pub pose: PoseSpec,
    #[serde(default)]
    pub accepts: AcceptFilter,
    /// Minimum capacity rating; 0 disables the check
    #[serde(default)]
    pub min_capacity: u32,
    #[serde(default = "default_snap_radius")]
    pub snap_radius: f32,
}

fn default_snap_radius() -> f32 {
    0.05
}

impl AnchorSpec {
    pub fn new(name: impl Into<String>, position: Point3D) -> Self {
        Self {
            name: name.into(),
            pose: PoseSpec::at(position),
            accepts: AcceptFilter::Any,
            min_capacity: 0,
            snap_radius: default_snap_radius(),
        }
    }

    pub fn accepting(mut self, filter: impl Into<AcceptFilter>) -> Self {
        self.accepts = filter.into();
        self
    }

    pub fn with_min_capacity(mut self, min_capacity: u32) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    pub fn with_snap_radius(mut self, radius: f32) -> Self {
        self.snap_radius = radius;
        self
    }
}

/// A pre-placed interactable. Category and capacity default to the catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    pub kind: String,
    pub origin: PoseSpec,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl ObjectSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, position: Point3D) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            origin: PoseSpec::at(position),
            category: None,
            capacity: None,
        }
    }
}

/// A surface the preparation tool can work on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepTargetSpec {
    pub name: String,
    pub work_point: Point3D,
    #[serde(default)]
    pub prepared: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub anchors: Vec<AnchorSpec>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub prep_targets: Vec<PrepTargetSpec>,
}

impl TaskDefinition {
    /// Structural checks, including that every object kind exists in `catalog`
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        unique("anchor", self.anchors.iter().map(|a| a.name.as_str()))?;
        unique("object", self.objects.iter().map(|o| o.name.as_str()))?;
        unique("prep target", self.prep_targets.iter().map(|t| t.name.as_str()))?;

        for anchor in &self.anchors {
            positive(&format!("anchors.{}.snap_radius", anchor.name), anchor.snap_radius)?;
        }

        for object in &self.objects {
            if !catalog.contains(&object.kind) {
                return Err(ConfigError::UnknownKind {
                    object: object.name.clone(),
                    kind: object.kind.clone(),
                });
            }
        }
        Ok(())
    }
}

fn unique<'a>(section: &'static str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(ConfigError::invalid(format!("{section} name"), "must not be empty"));
        }
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                section,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogEntry;

    fn catalog() -> Catalog {
        Catalog::new().with_entry("wire", CatalogEntry::conductor(Category::Hot, 15))
    }

    #[test]
    fn test_duplicate_anchor_names_rejected() {
        let task = TaskDefinition {
            anchors: vec![
                AnchorSpec::new("lug", Point3D::ORIGIN),
                AnchorSpec::new("lug", Point3D::new(0.1, 0.0, 0.0)),
            ],
            ..Default::default()
        };
        assert!(matches!(
            task.validate(&catalog()),
            Err(ConfigError::DuplicateName { section: "anchor", .. })
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let task = TaskDefinition {
            objects: vec![ObjectSpec::new("w1", "mystery", Point3D::ORIGIN)],
            ..Default::default()
        };
        assert!(matches!(
            task.validate(&catalog()),
            Err(ConfigError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_pose_spec_identity_rotation() {
        let pose = PoseSpec::at(Point3D::new(1.0, 2.0, 3.0)).to_pose();
        assert_eq!(pose.rotation, Quaternion::IDENTITY);
        assert_eq!(pose.position, Point3D::new(1.0, 2.0, 3.0));
    }
}
