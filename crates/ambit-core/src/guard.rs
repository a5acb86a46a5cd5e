//! Scoped bookmark that restores a captured context snapshot.

use tracing::trace;

use crate::slot::{ACTIVE, AmbientSlot, ContextStack};

/// Restores the ambient context captured when it was created.
///
/// Dropping the guard writes the captured snapshot back into the slot,
/// unconditionally and on every exit path, including unwinding.
///
/// Guards must be released in reverse order of acquisition within one
/// logical flow. Releasing them out of order is not detected: each release
/// simply overwrites the slot with its own snapshot, so pushes made under a
/// more recent guard that is still alive are discarded once an older guard
/// is dropped.
///
/// A guard belongs to the logical flow that created it. Holding one across
/// an `.await` is only sound inside a [`WithFlow`](crate::WithFlow) future,
/// which keeps the flow's slot value with the task as it moves between
/// threads.
#[must_use = "dropping the guard immediately restores the previous context"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<ContextStack>,
}

impl ContextGuard {
    /// Capture `previous` as the state to restore.
    pub(crate) fn new(previous: Option<ContextStack>) -> Self {
        Self { previous }
    }

    /// Install `stack` as the current context, capturing what it replaces.
    pub(crate) fn install(stack: Option<ContextStack>) -> Self {
        Self::new(ACTIVE.replace(stack))
    }

    /// Depth of the captured snapshot, or `None` if it was absent.
    #[must_use]
    pub fn captured_depth(&self) -> Option<usize> {
        self.previous.as_ref().map(ContextStack::len)
    }

    /// Restore the captured context now.
    ///
    /// Equivalent to dropping the guard.
    pub fn restore(self) {
        drop(self);
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let depth = self.captured_depth();
        ACTIVE.set(self.previous.take());
        trace!(depth = ?depth, "ambient context restored");
    }
}
