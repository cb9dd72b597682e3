//! Viewport change notifications.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::viewport::ViewportState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEventKind {
    Move,
    Zoom,
    Resize,
}

/// A change notification carrying the viewport state after the change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportEvent {
    pub kind: ViewportEventKind,
    pub state: ViewportState,
}

type Listener = Rc<dyn Fn(&ViewportEvent)>;

struct Entry {
    id: u64,
    kinds: Vec<ViewportEventKind>,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Listener registry owned by the viewport controller.
#[derive(Clone, Default)]
pub struct ViewportEvents {
    registry: Rc<RefCell<Registry>>,
}

impl ViewportEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for the given kinds.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// disposed or dropped.
    pub fn subscribe(
        &self,
        kinds: &[ViewportEventKind],
        listener: impl Fn(&ViewportEvent) + 'static,
    ) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(Entry {
            id,
            kinds: kinds.to_vec(),
            listener: Rc::new(listener),
        });

        Subscription {
            registry: Rc::downgrade(&self.registry),
            id: Some(id),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Delivers `event` to every listener of its kind.
    ///
    /// Listeners are collected first, so one may subscribe or unsubscribe
    /// while being notified.
    pub fn emit(&self, event: ViewportEvent) {
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.kinds.contains(&event.kind))
            .map(|entry| entry.listener.clone())
            .collect();

        for listener in listeners {
            listener(&event);
        }
    }
}

/// Disposer for a registered listener. Unsubscribes exactly once.
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: Option<u64>,
}

impl Subscription {
    pub fn dispose(mut self) {
        self.unsubscribe();
    }

    fn unsubscribe(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().entries.retain(|entry| entry.id != id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
