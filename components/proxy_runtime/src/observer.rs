//! Trap observation
//!
//! Observers attached to a proxy are told about every trap invocation once
//! the trap has returned, whether it succeeded or not.

use std::cell::RefCell;
use std::rc::Rc;

use core_types::Trap;

/// One trap invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapEvent {
    /// Which trap ran
    pub trap: Trap,
    /// Property name the trap was called with, if any
    pub name: Option<String>,
}

impl TrapEvent {
    /// Create an event
    pub fn new(trap: Trap, name: Option<&str>) -> Self {
        TrapEvent {
            trap,
            name: name.map(str::to_string),
        }
    }
}

/// Receives trap events from a proxy
pub trait TrapObserver {
    /// Called after each trap invocation
    fn on_trap(&self, event: &TrapEvent);
}

impl<F> TrapObserver for F
where
    F: Fn(&TrapEvent),
{
    fn on_trap(&self, event: &TrapEvent) {
        self(event)
    }
}

/// Observer that records events in order.
///
/// Clones share the same log, so a test can keep one handle and attach
/// another to the proxy.
///
/// # Examples
///
/// ```
/// use core_types::Trap;
/// use proxy_runtime::{TrapEvent, TrapObserver, TrapRecorder};
///
/// let recorder = TrapRecorder::new();
/// recorder.on_trap(&TrapEvent::new(Trap::Has, Some("first")));
/// assert_eq!(recorder.last_trap(), Some(Trap::Has));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrapRecorder {
    events: Rc<RefCell<Vec<TrapEvent>>>,
}

impl TrapRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        TrapRecorder::default()
    }

    /// Copy of all recorded events
    pub fn events(&self) -> Vec<TrapEvent> {
        self.events.borrow().clone()
    }

    /// Most recent event
    pub fn last(&self) -> Option<TrapEvent> {
        self.events.borrow().last().cloned()
    }

    /// Most recent trap
    pub fn last_trap(&self) -> Option<Trap> {
        self.events.borrow().last().map(|event| event.trap)
    }

    /// Recorded traps in order
    pub fn traps(&self) -> Vec<Trap> {
        self.events.borrow().iter().map(|event| event.trap).collect()
    }

    /// How many times `trap` ran
    pub fn count(&self, trap: Trap) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.trap == trap)
            .count()
    }

    /// Forget all events
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl TrapObserver for TrapRecorder {
    fn on_trap(&self, event: &TrapEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
