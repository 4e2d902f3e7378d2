//! Typed handles
//!
//! Handles are allocated from per-kind monotonic counters, so ordering by handle
//! is ordering by registration. Proximity tie-breaks rely on that.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// An object that can be grabbed and attached
    InteractableId,
    "object"
);
handle!(
    /// A typed connection slot
    AnchorId,
    "anchor"
);
handle!(
    /// A tracked hand or controller
    GrabberId,
    "grabber"
);
handle!(
    /// A surface the preparation tool works on
    PrepTargetId,
    "prep"
);

/// Monotonic allocator for one handle kind
#[derive(Debug, Default)]
pub(crate) struct Counter(u32);

impl Counter {
    pub(crate) fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}
