//! skillbench: interaction and attachment engine for hands-on procedural training
//!
//! The engine lives in [`core`]; the other modules are the building blocks it is
//! made of and are re-exported so applications need a single dependency.

pub use skillbench_config as config;
pub use skillbench_core as core;
pub use skillbench_input as input;
pub use skillbench_spatial as spatial;

pub use skillbench_core::{
    InteractionEvent, InteractionObserver, InteractionState, InteractionWorld, Rejection, TaskSession,
    TickReport, Verdict,
};
