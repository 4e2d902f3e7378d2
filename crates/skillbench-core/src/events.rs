//! Interaction notifications
//!
//! Events queue up while a tick runs and are handed to observers in one batch at
//! the end of it, so observers always see a settled world.

use serde::Serialize;

use crate::ids::{AnchorId, GrabberId, InteractableId, PrepTargetId};
use crate::interactable::InteractionState;
use crate::validator::{Rejection, Verdict};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// An interactable changed state. `anchor` is set when entering or leaving
    /// `Attached`; `grabber` when entering or leaving `Grabbed`.
    StateChanged {
        object: InteractableId,
        from: InteractionState,
        to: InteractionState,
        #[serde(skip_serializing_if = "Option::is_none")]
        anchor: Option<AnchorId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        grabber: Option<GrabberId>,
    },

    /// A placement was refused
    Rejected {
        object: InteractableId,
        #[serde(skip_serializing_if = "Option::is_none")]
        anchor: Option<AnchorId>,
        reason: Rejection,
    },

    /// A tool was applied to a work target
    ToolUsed {
        tool: InteractableId,
        target: PrepTargetId,
        verdict: Verdict,
    },
}

impl InteractionEvent {
    /// The interactable this event is about
    pub fn object(&self) -> InteractableId {
        match self {
            InteractionEvent::StateChanged { object, .. } | InteractionEvent::Rejected { object, .. } => *object,
            InteractionEvent::ToolUsed { tool, .. } => *tool,
        }
    }

    pub fn is_rejection(&self) -> bool {
        match self {
            InteractionEvent::Rejected { .. } => true,
            InteractionEvent::ToolUsed { verdict, .. } => !verdict.is_approved(),
            InteractionEvent::StateChanged { .. } => false,
        }
    }
}

/// Receives every event the engine emits. Completion checkers, feedback layers
/// and recorders hang off this.
pub trait InteractionObserver {
    fn on_event(&mut self, event: &InteractionEvent);
}

impl<F> InteractionObserver for F
where
    F: FnMut(&InteractionEvent),
{
    fn on_event(&mut self, event: &InteractionEvent) {
        self(event)
    }
}

/// Pending events plus the observers they go to
#[derive(Default)]
pub(crate) struct EventBus {
    pending: Vec<InteractionEvent>,
    observers: Vec<Box<dyn InteractionObserver>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl EventBus {
    pub(crate) fn push(&mut self, event: InteractionEvent) {
        self.pending.push(event);
    }

    pub(crate) fn subscribe(&mut self, observer: Box<dyn InteractionObserver>) {
        self.observers.push(observer);
    }

    /// Deliver everything pending and hand it back
    pub(crate) fn flush(&mut self) -> Vec<InteractionEvent> {
        let events = std::mem::take(&mut self.pending);
        for observer in &mut self.observers {
            for event in &events {
                observer.on_event(event);
            }
        }
        events
    }
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<InteractionEvent>,
}

impl TickReport {
    pub fn rejections(&self) -> impl Iterator<Item = &Rejection> {
        self.events.iter().filter_map(|event| match event {
            InteractionEvent::Rejected { reason, .. } => Some(reason),
            InteractionEvent::ToolUsed { verdict, .. } => verdict.rejection(),
            InteractionEvent::StateChanged { .. } => None,
        })
    }

    /// State transitions of one object this tick, in order
    pub fn transitions_of(&self, object: InteractableId) -> Vec<(InteractionState, InteractionState)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                InteractionEvent::StateChanged { object: o, from, to, .. } if *o == object => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn changed(object: u32, from: InteractionState, to: InteractionState) -> InteractionEvent {
        InteractionEvent::StateChanged {
            object: InteractableId::new(object),
            from,
            to,
            anchor: None,
            grabber: None,
        }
    }

    #[test]
    fn test_flush_delivers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut bus = EventBus::default();
        bus.subscribe(Box::new(move |event: &InteractionEvent| {
            sink.borrow_mut().push(event.object())
        }));

        bus.push(changed(1, InteractionState::Idle, InteractionState::Hovered));
        bus.push(changed(2, InteractionState::Idle, InteractionState::Hovered));
        assert!(seen.borrow().is_empty());

        let events = bus.flush();
        assert_eq!(events.len(), 2);
        assert_eq!(*seen.borrow(), vec![InteractableId::new(1), InteractableId::new(2)]);
        assert!(bus.flush().is_empty());
    }

    #[test]
    fn test_report_transitions() {
        let report = TickReport {
            tick: 4,
            events: vec![
                changed(1, InteractionState::Hovered, InteractionState::Grabbed),
                changed(2, InteractionState::Idle, InteractionState::Hovered),
                changed(1, InteractionState::Grabbed, InteractionState::Returning),
            ],
        };
        assert_eq!(
            report.transitions_of(InteractableId::new(1)),
            vec![
                (InteractionState::Hovered, InteractionState::Grabbed),
                (InteractionState::Grabbed, InteractionState::Returning)
            ]
        );
        assert_eq!(report.rejections().count(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(changed(3, InteractionState::Grabbed, InteractionState::Attached)).unwrap();
        assert_eq!(json["event"], "state_changed");
        assert_eq!(json["object"], 3);
        assert_eq!(json["to"], "attached");
        assert!(json.get("anchor").is_none());
    }
}
