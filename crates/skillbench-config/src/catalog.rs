//! Object catalog: per-type defaults shared by every instance of a kind

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skillbench_spatial::{Bounds, Point3D};

use crate::settings::positive;
use crate::{Category, PoseSpec, Result};

/// Defaults for one object kind (e.g. `"thhn_12_black"`, `"tape_measure"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub description: Option<String>,
    /// Conductor category; tools and fixtures leave this unset
    #[serde(default)]
    pub category: Option<Category>,
    /// Capacity rating (ampacity for conductors)
    #[serde(default)]
    pub capacity: u32,
    /// Pose of the object relative to the grab reference point while held
    #[serde(default)]
    pub grip_offset: PoseSpec,
    /// Shape used for long-range pointer hits
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub grab_radius: Option<f32>,
    /// Working tip in the object's local frame, for tools
    #[serde(default)]
    pub tip_offset: Option<Point3D>,
    /// How close the tip must be to a work point for the tool to take effect
    #[serde(default)]
    pub activation_distance: Option<f32>,
    #[serde(default = "default_grabbable")]
    pub grabbable: bool,
}

fn default_grabbable() -> bool {
    true
}

impl Default for CatalogEntry {
    fn default() -> Self {
        Self {
            description: None,
            category: None,
            capacity: 0,
            grip_offset: PoseSpec::default(),
            bounds: None,
            grab_radius: None,
            tip_offset: None,
            activation_distance: None,
            grabbable: true,
        }
    }
}

impl CatalogEntry {
    pub fn conductor(category: Category, capacity: u32) -> Self {
        Self {
            category: Some(category),
            capacity,
            ..Default::default()
        }
    }
}

/// Kind name to entry, ordered for stable iteration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: impl Into<String>, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(kind.into(), entry)
    }

    pub fn with_entry(mut self, kind: impl Into<String>, entry: CatalogEntry) -> Self {
        self.insert(kind, entry);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&CatalogEntry> {
        self.entries.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for (kind, entry) in &self.entries {
            if let Some(radius) = entry.grab_radius {
                positive(&format!("catalog.{kind}.grab_radius"), radius)?;
            }
            if let Some(distance) = entry.activation_distance {
                positive(&format!("catalog.{kind}.activation_distance"), distance)?;
            }
            if let Some(bounds) = entry.bounds {
                positive(&format!("catalog.{kind}.bounds"), bounds.bounding_radius())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_from_toml() {
        let raw = r#"
            [thhn_12_green]
            category = "ground"
            capacity = 20
            grip_offset = { position = [0.0, 0.0, 0.03], rotation_deg = [0.0, 90.0, 0.0] }
            bounds = { shape = "box", half_extents = [0.005, 0.005, 0.15] }

            [tape_measure]
            tip_offset = [0.0, 0.0, 0.04]
            grab_radius = 0.07
        "#;
        let catalog: Catalog = toml::from_str(raw).unwrap();
        assert_eq!(catalog.len(), 2);

        let wire = catalog.get("thhn_12_green").unwrap();
        assert_eq!(wire.category, Some(Category::Ground));
        assert_eq!(wire.capacity, 20);
        assert!(wire.grabbable);
        assert!(matches!(wire.bounds, Some(Bounds::Box { .. })));

        let tape = catalog.get("tape_measure").unwrap();
        assert_eq!(tape.category, None);
        assert_eq!(tape.tip_offset, Some(Point3D::new(0.0, 0.0, 0.04)));
        catalog.validate().unwrap();
    }

    #[test]
    fn test_negative_grab_radius_rejected() {
        let catalog = Catalog::new().with_entry(
            "bad",
            CatalogEntry {
                grab_radius: Some(-1.0),
                ..Default::default()
            },
        );
        assert!(catalog.validate().is_err());
    }
}
