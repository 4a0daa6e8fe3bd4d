//! Keyboard dispatch.
//!
//! Key handlers form a stack: the most recently registered handler sees an
//! event first and may consume it by returning `true`, stopping propagation.
//! Registration hands back a numeric id used for removal.

use std::rc::Rc;

use bitflags::bitflags;
use tracing::trace;

use crate::error::Error;

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Host key name, e.g. `"a"`, `"Enter"`, `"ArrowLeft"`.
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

/// Handler invoked per key event; returns whether the event was consumed.
pub type KeyHandler = Rc<dyn Fn(&KeyEvent) -> bool>;

// =============================================================================
// KeyDispatcher
// =============================================================================

/// Ordered key-handler registry, most recent first.
#[derive(Default)]
pub struct KeyDispatcher {
    handlers: Vec<(usize, KeyHandler)>,
    next_id: usize,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Register a handler; returns the id to remove it with.
    pub fn add(&mut self, handler: impl Fn(&KeyEvent) -> bool + 'static) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers.push((id, Rc::new(handler)));
        id
    }

    /// Remove a previously registered handler.
    pub fn remove(&mut self, id: usize) -> Result<(), Error> {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        if self.handlers.len() == before {
            return Err(Error::UnknownListener(id));
        }
        Ok(())
    }

    /// Deliver an event, newest handler first. Returns whether any handler
    /// consumed it.
    pub fn dispatch(&self, event: &KeyEvent) -> bool {
        for (id, handler) in self.handlers.iter().rev() {
            if handler(event) {
                trace!(key = %event.key, handler = id, "key consumed");
                return true;
            }
        }
        false
    }

    pub fn reset(&mut self) {
        self.handlers.clear();
        self.next_id = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_newest_handler_first_and_consumption() {
        let mut dispatcher = KeyDispatcher::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let a = order.clone();
        dispatcher.add(move |_| {
            a.borrow_mut().push("first");
            false
        });
        let b = order.clone();
        dispatcher.add(move |e| {
            b.borrow_mut().push("second");
            e.key == "Enter"
        });

        // Unconsumed: both run, newest first.
        assert!(!dispatcher.dispatch(&KeyEvent::new("a")));
        assert_eq!(*order.borrow(), vec!["second", "first"]);

        // Consumed by the newest: the older handler never sees it.
        order.borrow_mut().clear();
        assert!(dispatcher.dispatch(&KeyEvent::new("Enter")));
        assert_eq!(*order.borrow(), vec!["second"]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut dispatcher = KeyDispatcher::new();
        let id = dispatcher.add(|_| true);
        assert!(dispatcher.dispatch(&KeyEvent::new("a")));

        dispatcher.remove(id).unwrap();
        assert!(!dispatcher.dispatch(&KeyEvent::new("a")));
        assert_eq!(dispatcher.remove(id), Err(Error::UnknownListener(id)));
    }

    #[test]
    fn test_modifiers() {
        let mut dispatcher = KeyDispatcher::new();
        dispatcher.add(|e| e.modifiers.contains(Modifiers::CTRL));

        assert!(!dispatcher.dispatch(&KeyEvent::new("s")));
        assert!(dispatcher.dispatch(&KeyEvent::with_modifiers("s", Modifiers::CTRL)));
    }
}
