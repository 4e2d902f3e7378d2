//! Engine errors
//!
//! These are caller mistakes (unknown handles, commands that make no sense in the
//! current state). Validation failures are [`Rejection`](crate::Rejection)s, not
//! errors.

use skillbench_config::ConfigError;

use crate::ids::{AnchorId, GrabberId, InteractableId, PrepTargetId};
use crate::interactable::GrabRefusal;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown interactable: {0}")]
    UnknownInteractable(InteractableId),

    #[error("Unknown anchor: {0}")]
    UnknownAnchor(AnchorId),

    #[error("Unknown grabber: {0}")]
    UnknownGrabber(GrabberId),

    #[error("Unknown prep target: {0}")]
    UnknownPrepTarget(PrepTargetId),

    #[error("No {kind} named '{name}'")]
    UnknownName { kind: &'static str, name: String },

    #[error("{object} is held by {holder}")]
    Held {
        object: InteractableId,
        holder: GrabberId,
    },

    #[error("{grabber} is already holding {held}")]
    HandFull {
        grabber: GrabberId,
        held: InteractableId,
    },

    #[error("Grab refused: {0}")]
    Refused(#[from] GrabRefusal),

    #[error("{0} is not a tool")]
    NotATool(InteractableId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
