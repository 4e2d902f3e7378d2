//! Input abstraction for tracked hands and controllers
//!
//! Provides:
//! - [`HandFrame`]: one tick's worth of pose and intent for a single grabber
//! - [`TrackingSource`]: the pull interface any tracking backend implements
//! - [`EdgeDetector`]: hysteresis-based engage/release edge detection per channel
//! - [`ReplaySource`] and [`LiveSource`]: deterministic drivers for tests and tools

mod frame;
mod intent;
mod replay;
mod source;

pub use frame::HandFrame;
pub use intent::{Edge, EdgeDetector, GrabStyle, IntentChannel, IntentThresholds};
pub use replay::{Recording, ReplayError, ReplaySource};
pub use source::{LiveHandle, LiveSource, StaticSource, TrackingSource};
