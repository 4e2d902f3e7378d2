//! Configuration for skillbench task sessions
//!
//! A task file is a single TOML document:
//!
//! ```toml
//! [settings]                 # engine policy and grabber tuning
//! [catalog.<kind>]           # per-type grip offsets, shape, category, capacity
//! [task]                     # name/description
//! [[task.anchors]]           # connection points for this task
//! [[task.objects]]           # pre-placed interactables
//! [[task.prep_targets]]      # surfaces the preparation tool works on
//! ```
//!
//! Every section is optional; [`TaskBundle::from_path`] validates cross references.

mod bundle;
mod catalog;
mod error;
mod settings;
mod tags;
mod task;

pub use bundle::TaskBundle;
pub use catalog::{Catalog, CatalogEntry};
pub use error::{ConfigError, Result};
pub use settings::{EngineSettings, GrabberSettings, IndexSettings};
pub use tags::{AcceptFilter, Category};
pub use task::{AnchorSpec, ObjectSpec, PoseSpec, PrepTargetSpec, TaskDefinition};
