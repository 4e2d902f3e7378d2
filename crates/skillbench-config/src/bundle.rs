//! Task file loading

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Catalog, ConfigError, EngineSettings, Result, TaskDefinition};

/// Everything needed to set up one task session, as read from a task file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBundle {
    #[serde(default)]
    pub settings: EngineSettings,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub task: TaskDefinition,
}

impl TaskBundle {
    /// Parse and validate
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let bundle: TaskBundle = toml::from_str(raw)?;
        bundle.validate()?;
        tracing::debug!(
            "Parsed task '{}' ({} anchors, {} objects, {} catalog kinds)",
            bundle.task.name,
            bundle.task.anchors.len(),
            bundle.task.objects.len(),
            bundle.catalog.len()
        );
        Ok(bundle)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_toml_str(&raw)?;
        tracing::info!("Loaded task '{}' from {}", bundle.task.name, path.display());
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        self.catalog.validate()?;
        self.task.validate(&self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AcceptFilter, Category, IndexSettings};
    use std::io::Write;

    const PANEL_TASK: &str = r#"
        [settings]
        return_on_invalid_release = false
        index = { kind = "grid", cell_size = 0.25 }

        [settings.grabber]
        grab_radius = 0.1

        [catalog.thhn_12_green]
        category = "ground"
        capacity = 20

        [catalog.thhn_14_black]
        category = "hot"
        capacity = 15

        [task]
        name = "Ground the panel"

        [[task.anchors]]
        name = "ground_bar_1"
        pose = { position = [0.0, 1.2, 0.4] }
        accepts = "ground"
        min_capacity = 20

        [[task.anchors]]
        name = "spare"
        pose = { position = [0.2, 1.2, 0.4] }
        accepts = "*"

        [[task.objects]]
        name = "green_wire"
        kind = "thhn_12_green"
        origin = { position = [0.5, 1.0, 0.2], rotation_deg = [0.0, 0.0, 90.0] }

        [[task.objects]]
        name = "black_wire"
        kind = "thhn_14_black"
        origin = { position = [0.6, 1.0, 0.2] }
        capacity = 20
    "#;

    #[test]
    fn test_parse_full_task() {
        let bundle = TaskBundle::from_toml_str(PANEL_TASK).unwrap();
        assert!(!bundle.settings.return_on_invalid_release);
        assert_eq!(bundle.settings.index, IndexSettings::Grid { cell_size: 0.25 });
        assert_eq!(bundle.settings.grabber.grab_radius, 0.1);
        // Unspecified grabber fields keep their defaults.
        assert_eq!(bundle.settings.grabber.engage_threshold, 0.8);

        assert_eq!(bundle.task.anchors.len(), 2);
        assert_eq!(bundle.task.anchors[0].accepts, AcceptFilter::Only(Category::Ground));
        assert_eq!(bundle.task.anchors[0].min_capacity, 20);
        assert_eq!(bundle.task.anchors[1].accepts, AcceptFilter::Any);
        assert_eq!(bundle.task.anchors[1].snap_radius, 0.05);
        assert_eq!(bundle.task.objects[1].capacity, Some(20));
    }

    #[test]
    fn test_bad_category_is_parse_error() {
        let raw = r#"
            [[task.anchors]]
            name = "a"
            pose = { position = [0.0, 0.0, 0.0] }
            accepts = "phase"
        "#;
        assert!(matches!(TaskBundle::from_toml_str(raw), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_path_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PANEL_TASK.as_bytes()).unwrap();
        let bundle = TaskBundle::from_path(file.path()).unwrap();
        assert_eq!(bundle.task.name, "Ground the panel");

        let err = TaskBundle::from_path("/no/such/task.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
