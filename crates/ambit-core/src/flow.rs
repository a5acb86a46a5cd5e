//! Carrying a logical flow across threads, tasks and `.await` points.
//!
//! The slot is thread-bound, so anything that leaves the current thread
//! takes its context along explicitly: capture a [`Flow`] and either run a
//! closure inside it ([`Flow::scope`]) or bind it to a future
//! ([`Flow::instrument`], [`FlowExt`]).
//!
//! Capturing is a fork. The fork starts from the captured snapshot and its
//! own pushes are never visible to the flow it was captured from.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project::{pin_project, pinned_drop};

use crate::guard::ContextGuard;
use crate::slot::{ACTIVE, AmbientSlot, ContextStack};

/// A snapshot of a logical flow's ambient context.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    stack: Option<ContextStack>,
}

impl Flow {
    /// Snapshot the calling flow, including an absent or suspended context.
    #[must_use]
    pub fn current() -> Self {
        Self {
            stack: ACTIVE.get(),
        }
    }

    /// A flow with no ambient context.
    #[must_use]
    pub fn detached() -> Self {
        Self { stack: None }
    }

    /// The captured stack.
    #[must_use]
    pub fn stack(&self) -> Option<&ContextStack> {
        self.stack.as_ref()
    }

    /// Number of enrichers captured.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.as_ref().map_or(0, ContextStack::len)
    }

    /// Whether the captured context is absent (never pushed, or suspended).
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.stack.is_none()
    }

    /// Run `f` with this flow installed as the current context.
    ///
    /// The caller's context is restored afterwards, on every exit path.
    pub fn scope<R>(self, f: impl FnOnce() -> R) -> R {
        let _restore = ContextGuard::install(self.stack);
        f()
    }

    /// Bind this flow to `future`.
    pub fn instrument<F: Future>(self, future: F) -> WithFlow<F> {
        WithFlow {
            inner: Some(future),
            stack: self.stack,
        }
    }
}

/// Future that runs its inner future inside its own logical flow.
///
/// The flow's slot value is installed before every poll and saved back
/// afterwards, so pushes made by the inner future survive suspension and
/// resumption on any worker thread. The same happens when the inner future
/// is dropped early, so guards it still holds restore into the right flow.
#[pin_project(PinnedDrop)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct WithFlow<F> {
    #[pin]
    inner: Option<F>,
    stack: Option<ContextStack>,
}

impl<F> WithFlow<F> {
    /// The flow's current snapshot between polls.
    #[must_use]
    pub fn flow(&self) -> Flow {
        Flow {
            stack: self.stack.clone(),
        }
    }
}

/// Installs a flow for the duration of one poll (or drop) and saves its
/// final value back into the owning future.
struct Entered<'a> {
    saved: &'a mut Option<ContextStack>,
    outer: Option<ContextStack>,
}

impl<'a> Entered<'a> {
    fn enter(saved: &'a mut Option<ContextStack>) -> Self {
        let outer = ACTIVE.replace(saved.take());
        Self { saved, outer }
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        *self.saved = ACTIVE.replace(self.outer.take());
    }
}

impl<F: Future> Future for WithFlow<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut inner = this.inner;
        let _entered = Entered::enter(this.stack);

        let Some(future) = inner.as_mut().as_pin_mut() else {
            panic!("`WithFlow` polled after completion");
        };
        let output = future.poll(cx);
        if output.is_ready() {
            inner.set(None);
        }
        output
    }
}

#[pinned_drop]
impl<F> PinnedDrop for WithFlow<F> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        let mut inner = this.inner;
        if inner.is_none() {
            return;
        }
        let _entered = Entered::enter(this.stack);
        inner.set(None);
    }
}

/// Extension methods for binding futures to a logical flow.
pub trait FlowExt: Future + Sized {
    /// Run this future inside `flow`.
    fn in_flow(self, flow: Flow) -> WithFlow<Self> {
        flow.instrument(self)
    }

    /// Run this future inside a fork of the calling flow.
    ///
    /// Use this when handing a future to `tokio::spawn` or any executor that
    /// may poll it on another thread.
    fn in_current_flow(self) -> WithFlow<Self> {
        Flow::current().instrument(self)
    }
}

impl<F: Future> FlowExt for F {}
