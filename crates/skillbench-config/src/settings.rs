//! Engine policy and grabber tuning

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Engine-wide policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Fly objects back to their origin when released somewhere invalid. When off
    /// they stay where they were dropped.
    pub return_on_invalid_release: bool,
    /// Meters per second while returning
    pub return_speed: f32,
    /// Distance under which a returning object snaps onto its origin
    pub return_epsilon: f32,
    /// Default grab radius for catalog entries that do not set one
    pub default_grab_radius: f32,
    pub index: IndexSettings,
    pub grabber: GrabberSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            return_on_invalid_release: true,
            return_speed: 2.0,
            return_epsilon: 1.0e-3,
            default_grab_radius: 0.06,
            index: IndexSettings::default(),
            grabber: GrabberSettings::default(),
        }
    }
}

/// Which proximity index backs anchor lookups
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexSettings {
    #[default]
    Linear,
    Grid { cell_size: f32 },
}

/// Per-hand tuning shared by every grabber in a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabberSettings {
    /// Reach of the near-field grab around the reference point
    pub grab_radius: f32,
    /// Reach of the forward pointer used when nothing is in near-field reach
    pub pointer_range: f32,
    pub engage_threshold: f32,
    pub release_threshold: f32,
}

impl Default for GrabberSettings {
    fn default() -> Self {
        Self {
            grab_radius: 0.08,
            pointer_range: 3.0,
            engage_threshold: 0.8,
            release_threshold: 0.5,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        positive("settings.return_speed", self.return_speed)?;
        positive("settings.return_epsilon", self.return_epsilon)?;
        positive("settings.default_grab_radius", self.default_grab_radius)?;
        if let IndexSettings::Grid { cell_size } = self.index {
            positive("settings.index.cell_size", cell_size)?;
        }
        self.grabber.validate()
    }
}

impl GrabberSettings {
    pub fn validate(&self) -> Result<()> {
        positive("settings.grabber.grab_radius", self.grab_radius)?;
        if self.pointer_range < 0.0 {
            return Err(ConfigError::invalid(
                "settings.grabber.pointer_range",
                "must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.engage_threshold)
            || !(0.0..=1.0).contains(&self.release_threshold)
        {
            return Err(ConfigError::invalid(
                "settings.grabber",
                "thresholds must lie in 0..=1",
            ));
        }
        if self.release_threshold > self.engage_threshold {
            return Err(ConfigError::invalid(
                "settings.grabber.release_threshold",
                format!(
                    "{} exceeds engage_threshold {}",
                    self.release_threshold, self.engage_threshold
                ),
            ));
        }
        Ok(())
    }
}

pub(crate) fn positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected a positive number, got {value}")))
    }
}
