//! Tracking source abstraction

use std::cell::RefCell;
use std::rc::Rc;

use crate::HandFrame;

/// A pose/intent provider for one grabber.
///
/// Polled exactly once per tick. Returning `None` means "no new sample this tick";
/// the grabber then keeps using its previous frame.
pub trait TrackingSource {
    fn poll(&mut self) -> Option<HandFrame>;
}

impl<F> TrackingSource for F
where
    F: FnMut() -> Option<HandFrame>,
{
    fn poll(&mut self) -> Option<HandFrame> {
        self()
    }
}

/// Always reports the same frame
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    frame: HandFrame,
}

impl StaticSource {
    pub fn new(frame: HandFrame) -> Self {
        Self { frame }
    }
}

impl TrackingSource for StaticSource {
    fn poll(&mut self) -> Option<HandFrame> {
        Some(self.frame.clone())
    }
}

/// A source driven from outside the engine through a [`LiveHandle`].
///
/// The engine is single-threaded, so the shared slot is an `Rc<RefCell<_>>`.
#[derive(Debug, Default)]
pub struct LiveSource {
    slot: Rc<RefCell<Option<HandFrame>>>,
}

/// Write side of a [`LiveSource`]
#[derive(Debug, Clone)]
pub struct LiveHandle {
    slot: Rc<RefCell<Option<HandFrame>>>,
}

impl LiveSource {
    pub fn new() -> (Self, LiveHandle) {
        let slot = Rc::new(RefCell::new(None));
        (
            Self { slot: slot.clone() },
            LiveHandle { slot },
        )
    }
}

impl LiveHandle {
    /// Frame delivered on the next poll
    pub fn push(&self, frame: HandFrame) {
        *self.slot.borrow_mut() = Some(frame);
    }
}

impl TrackingSource for LiveSource {
    fn poll(&mut self) -> Option<HandFrame> {
        self.slot.borrow_mut().take()
    }
}
