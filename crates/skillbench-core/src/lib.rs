//! skillbench-core: the interaction and attachment engine
//!
//! Tracked hands ([`Grabber`]s) pick up [`Interactable`]s and drop them onto typed
//! [`AnchorPoint`]s. Whether an object may sit on an anchor is decided by a
//! [`Validator`]; refusals come back as [`Rejection`] values and the object flies
//! home instead. Tools reuse the same validator contract.
//!
//! ```no_run
//! use skillbench_config::{AnchorSpec, Category};
//! use skillbench_core::{InteractableSpec, InteractionWorld};
//! use skillbench_input::LiveSource;
//! use skillbench_spatial::{Point3D, Pose};
//!
//! let mut world = InteractionWorld::default();
//! world.add_anchor(&AnchorSpec::new("ground_bar", Point3D::new(0.0, 1.2, 0.4)).accepting(Category::Ground));
//! world.spawn(
//!     InteractableSpec::new("green", Pose::from_position(Point3D::new(0.5, 1.0, 0.2)))
//!         .with_category(Category::Ground)
//!         .with_capacity(20),
//! );
//! let (source, _hand) = LiveSource::new();
//! world.add_grabber("right", Box::new(source));
//!
//! let report = world.tick(1.0 / 90.0);
//! for event in &report.events {
//!     println!("{}", serde_json::to_string(event).unwrap());
//! }
//! ```

mod anchor;
mod error;
mod events;
mod grabber;
mod ids;
mod interactable;
mod proximity;
mod setup;
pub mod tools;
mod validator;
mod world;

#[cfg(test)]
mod test_support;

pub use anchor::{AnchorFilter, AnchorPoint, AnchorSet};
pub use error::{EngineError, Result};
pub use events::{InteractionEvent, InteractionObserver, TickReport};
pub use grabber::{GrabIntent, Grabber};
pub use ids::{AnchorId, GrabberId, InteractableId, PrepTargetId};
pub use interactable::{
    GrabRefusal, Interactable, InteractableSpec, InteractionState, Parent, PhysicsFlags, ReleaseOutcome,
    ToolProfile, TypeTag,
};
pub use proximity::{index_for, nearest_of, GridIndex, LinearIndex, ProximityIndex};
pub use setup::{spec_for, TaskSession};
pub use validator::{ConstraintValidator, Rejection, Validator, Verdict};
pub use world::InteractionWorld;
