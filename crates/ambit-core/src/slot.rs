//! Storage cell holding the current context stack of a logical flow.

use std::cell::RefCell;

use crate::enricher::SharedEnricher;
use crate::stack::PersistentStack;

/// The stack of enrichers that make up an ambient context.
pub type ContextStack = PersistentStack<SharedEnricher>;

/// Per-flow storage for the current context stack.
///
/// `None` is distinct from an empty stack: it marks a flow whose context
/// has been suspended (or never created).
///
/// Implementations must make a write visible to later reads on the same
/// logical flow and never to a concurrently running flow.
pub trait AmbientSlot {
    /// Read the current value.
    fn get(&self) -> Option<ContextStack>;

    /// Overwrite the current value.
    fn set(&self, value: Option<ContextStack>) {
        drop(self.replace(value));
    }

    /// Overwrite the current value, returning the previous one.
    fn replace(&self, value: Option<ContextStack>) -> Option<ContextStack>;
}

thread_local! {
    static CURRENT: RefCell<Option<ContextStack>> = const { RefCell::new(None) };
}

/// Thread-bound slot backend.
///
/// A logical flow maps to the thread it runs on. Flows that move between
/// threads (async tasks) carry their value explicitly via
/// [`WithFlow`](crate::WithFlow), which installs it around each poll.
///
/// Reads during thread teardown see `None`; writes are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSlot;

impl AmbientSlot for ThreadSlot {
    fn get(&self) -> Option<ContextStack> {
        CURRENT
            .try_with(|cell| cell.borrow().clone())
            .ok()
            .flatten()
    }

    fn replace(&self, value: Option<ContextStack>) -> Option<ContextStack> {
        // The previous value leaves the closure before it is dropped, so an
        // enricher's destructor may touch the slot again.
        CURRENT
            .try_with(|cell| cell.replace(value))
            .ok()
            .flatten()
    }
}

/// The slot backend compiled into this build.
pub(crate) const ACTIVE: ThreadSlot = ThreadSlot;
