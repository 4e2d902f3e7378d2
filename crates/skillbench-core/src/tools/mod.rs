//! Tool validators
//!
//! Tools are ordinary interactables with a [`ToolProfile`](crate::ToolProfile).
//! What they do when used is decided here, with the same [`Validator`](crate::Validator)
//! contract as placement.

mod measure;
mod surface_prep;

pub use measure::{LengthUnit, Measurement, MeasuringTape, ToleranceCheck, WithinTolerance};
pub use surface_prep::{PrepTarget, SurfacePrep, SurfacePrepTool};
