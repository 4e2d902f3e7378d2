//! Placement and tool validation
//!
//! Every check in the engine returns a [`Verdict`]. Rejections are values, not
//! errors: they are reported to observers and drive the release fallback, but
//! never abort a tick.

use serde::Serialize;
use skillbench_config::{AcceptFilter, Category};

use crate::anchor::AnchorPoint;
use crate::ids::{AnchorId, InteractableId};
use crate::interactable::{Interactable, TypeTag};
use crate::tools::LengthUnit;

/// Why a placement or tool action was refused
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error(
        "{candidate} is {} but {anchor} only accepts {expected}",
        .found.map_or("untyped", |c| c.as_str())
    )]
    TypeMismatch {
        candidate: InteractableId,
        anchor: AnchorId,
        expected: AcceptFilter,
        found: Option<Category>,
    },

    #[error("{candidate} is rated {actual} but {anchor} requires at least {required}")]
    CapacityInsufficient {
        candidate: InteractableId,
        anchor: AnchorId,
        required: u32,
        actual: u32,
    },

    #[error("{anchor} is already occupied by {occupant}")]
    Occupied {
        anchor: AnchorId,
        occupant: InteractableId,
    },

    #[error("Tool tip is {distance:.3}m away, must be within {limit:.3}m")]
    TooFar { distance: f32, limit: f32 },

    #[error("'{target}' is already done")]
    AlreadyDone { target: String },

    #[error("Measured {measured:.2}{} but expected {expected:.2} ± {tolerance:.2}", .unit.symbol())]
    OutOfTolerance {
        measured: f32,
        expected: f32,
        tolerance: f32,
        unit: LengthUnit,
    },
}

impl Rejection {
    /// Stable short code for feedback and hint layers
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::TypeMismatch { .. } => "type_mismatch",
            Rejection::CapacityInsufficient { .. } => "capacity_insufficient",
            Rejection::Occupied { .. } => "occupied",
            Rejection::TooFar { .. } => "too_far",
            Rejection::AlreadyDone { .. } => "already_done",
            Rejection::OutOfTolerance { .. } => "out_of_tolerance",
        }
    }
}

/// Outcome of a validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "rejection", rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Approved => None,
            Verdict::Rejected(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Verdict::Approved => Ok(()),
            Verdict::Rejected(reason) => Err(reason),
        }
    }
}

impl From<Result<(), Rejection>> for Verdict {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Verdict::Approved,
            Err(reason) => Verdict::Rejected(reason),
        }
    }
}

/// Decides whether `subject` may act on `target`. Implementations must be pure:
/// the same inputs always yield the same verdict.
pub trait Validator<S: ?Sized, T: ?Sized> {
    fn evaluate(&self, subject: &S, target: &T) -> Verdict;
}

/// Category and capacity rules for attaching an interactable to an anchor.
///
/// Rules run in order and the first failure wins:
/// 1. the anchor's filter must accept the candidate's category (an untyped
///    candidate only passes an `Any` filter)
/// 2. a non-zero `min_capacity` requires `capacity >= min_capacity`
///
/// Occupancy is not a validation rule; [`AnchorPoint`] checks it before asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintValidator;

impl ConstraintValidator {
    pub fn check(&self, candidate: InteractableId, tag: &TypeTag, anchor: &AnchorPoint) -> Verdict {
        let type_ok = match (anchor.accepts(), tag.category) {
            (AcceptFilter::Any, _) => true,
            (filter, Some(category)) => filter.accepts(category),
            (AcceptFilter::Only(_), None) => false,
        };
        if !type_ok {
            return Verdict::Rejected(Rejection::TypeMismatch {
                candidate,
                anchor: anchor.id(),
                expected: anchor.accepts(),
                found: tag.category,
            });
        }

        let required = anchor.min_capacity();
        if required > 0 && tag.capacity < required {
            return Verdict::Rejected(Rejection::CapacityInsufficient {
                candidate,
                anchor: anchor.id(),
                required,
                actual: tag.capacity,
            });
        }

        Verdict::Approved
    }
}

impl Validator<Interactable, AnchorPoint> for ConstraintValidator {
    fn evaluate(&self, subject: &Interactable, target: &AnchorPoint) -> Verdict {
        self.check(subject.id(), subject.tag(), target)
    }
}
