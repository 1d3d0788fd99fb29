use std::cell::RefCell;
use std::rc::Rc;

/// Shared callback reference. Identity (for deduplication and removal) is the
/// `Rc` allocation, so the same handler value must be reused to remove it.
pub type Handler<E> = Rc<dyn Fn(&E) -> bool>;

/// Wraps a closure into a [`Handler`].
pub fn handler<E>(f: impl Fn(&E) -> bool + 'static) -> Handler<E> {
    Rc::new(f)
}

enum Entry<E> {
    Callback(Handler<E>),
    List(EventHandlerList<E>),
}

impl<E> Clone for Entry<E> {
    fn clone(&self) -> Self {
        match self {
            Entry::Callback(handler) => Entry::Callback(handler.clone()),
            Entry::List(list) => Entry::List(list.clone()),
        }
    }
}

/// Ordered multicast callback registry.
///
/// Every observable event in the toolkit (resize, click, focus, property
/// change) is an `EventHandlerList`. Handlers run in registration order and
/// the invocation result is the boolean OR of every handler's result — all
/// handlers always run, there is no short-circuit on the first `true`.
///
/// A list can itself be registered inside another list, in which case
/// invoking the outer list invokes the nested one as a single handler.
///
/// Handlers may add or remove handlers re-entrantly: the registry is
/// snapshotted before each invocation. A panicking handler aborts the
/// remaining invocations.
pub struct EventHandlerList<E> {
    entries: Rc<RefCell<Vec<Entry<E>>>>,
}

impl<E> Clone for EventHandlerList<E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<E> Default for EventHandlerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventHandlerList<E> {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Registers a handler. Idempotent by handler identity.
    pub fn add(&self, handler: &Handler<E>) {
        let mut entries = self.entries.borrow_mut();
        let present = entries.iter().any(|entry| match entry {
            Entry::Callback(existing) => Rc::ptr_eq(existing, handler),
            Entry::List(_) => false,
        });
        if !present {
            entries.push(Entry::Callback(handler.clone()));
        }
    }

    /// Registers another list as a single composite handler.
    pub fn add_list(&self, list: &EventHandlerList<E>) {
        let mut entries = self.entries.borrow_mut();
        let present = entries.iter().any(|entry| match entry {
            Entry::Callback(_) => false,
            Entry::List(existing) => Rc::ptr_eq(&existing.entries, &list.entries),
        });
        if !present {
            entries.push(Entry::List(list.clone()));
        }
    }

    /// Removes a handler, returning whether it was present.
    pub fn remove(&self, handler: &Handler<E>) -> bool {
        let mut entries = self.entries.borrow_mut();
        let position = entries.iter().position(|entry| match entry {
            Entry::Callback(existing) => Rc::ptr_eq(existing, handler),
            Entry::List(_) => false,
        });
        match position {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes a nested list, returning whether it was present.
    pub fn remove_list(&self, list: &EventHandlerList<E>) -> bool {
        let mut entries = self.entries.borrow_mut();
        let position = entries.iter().position(|entry| match entry {
            Entry::Callback(_) => false,
            Entry::List(existing) => Rc::ptr_eq(&existing.entries, &list.entries),
        });
        match position {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Invokes every handler in registration order with the same event.
    /// Returns `true` iff any handler returned `true`.
    pub fn invoke(&self, event: &E) -> bool {
        let snapshot: Vec<Entry<E>> = self.entries.borrow().clone();
        let mut handled = false;
        for entry in &snapshot {
            let result = match entry {
                Entry::Callback(handler) => handler(event),
                Entry::List(list) => list.invoke(event),
            };
            handled = handled || result;
        }
        handled
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
