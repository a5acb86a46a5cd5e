//! The public ambient-context surface.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::enricher::{Enricher, PropertyEnricher, SharedEnricher};
use crate::error::{ContextError, ContextResult};
use crate::event::LogEvent;
use crate::factory::PropertyFactory;
use crate::guard::ContextGuard;
use crate::slot::{ACTIVE, AmbientSlot, ContextStack};

/// Ambient log context for the current logical flow.
///
/// Properties pushed here decorate every log event enriched while the
/// returned [`ContextGuard`] is alive, without threading them through
/// function parameters.
///
/// ```
/// use ambit_core::{DefaultPropertyFactory, Level, LogContext, LogEvent};
///
/// let _request = LogContext::push_property("RequestId", "abc");
/// let _user = LogContext::push_property("UserId", 42);
///
/// let mut event = LogEvent::new(Level::Info, "handled");
/// LogContext::enrich(&mut event, &DefaultPropertyFactory::new());
/// assert!(event.has_property("RequestId"));
/// assert!(event.has_property("UserId"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LogContext;

impl LogContext {
    /// Push `name = value` as a scalar property.
    pub fn push_property(name: impl Into<String>, value: impl Into<Value>) -> ContextGuard {
        Self::push_property_with(name, value, false)
    }

    /// Push a property whose composite value is decomposed into a structure.
    pub fn push_destructured(name: impl Into<String>, value: impl Into<Value>) -> ContextGuard {
        Self::push_property_with(name, value, true)
    }

    /// Push a property, choosing whether composite values are destructured.
    pub fn push_property_with(
        name: impl Into<String>,
        value: impl Into<Value>,
        destructure: bool,
    ) -> ContextGuard {
        Self::push(PropertyEnricher::new(name, value).with_destructure(destructure))
    }

    /// Push a single enricher.
    pub fn push(enricher: impl Enricher + 'static) -> ContextGuard {
        Self::push_shared(Arc::new(enricher))
    }

    /// Push a single shared enricher.
    pub fn push_shared(enricher: SharedEnricher) -> ContextGuard {
        let current = ACTIVE.get().unwrap_or_default();
        let next = current.push(enricher);
        let depth = next.len();
        ACTIVE.set(Some(next));
        trace!(depth, "ambient enricher pushed");
        ContextGuard::new(Some(current))
    }

    /// Push a batch of enrichers.
    ///
    /// Enrichers are pushed in sequence order, so the last one is applied
    /// first. The returned guard undoes the whole batch at once.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidArgument`] if `enrichers` is `None`.
    /// The current context is left untouched in that case. An empty slice is
    /// accepted.
    pub fn push_properties(enrichers: Option<&[SharedEnricher]>) -> ContextResult<ContextGuard> {
        let enrichers = enrichers.ok_or_else(|| {
            ContextError::InvalidArgument("enrichers must not be absent".to_string())
        })?;
        Ok(Self::push_enrichers(enrichers.iter().cloned()))
    }

    /// Push every enricher in `enrichers` as one batch.
    pub fn push_enrichers<I>(enrichers: I) -> ContextGuard
    where
        I: IntoIterator<Item = SharedEnricher>,
    {
        let current = ACTIVE.get().unwrap_or_default();
        let next = enrichers
            .into_iter()
            .fold(current.clone(), |stack, enricher| stack.push(enricher));
        let pushed = next.len().saturating_sub(current.len());
        ACTIVE.set(Some(next));
        trace!(pushed, "ambient enricher batch pushed");
        ContextGuard::new(Some(current))
    }

    /// Suspend the ambient context.
    ///
    /// Until the returned guard is dropped, [`enrich`](Self::enrich) adds
    /// nothing. Dropping it restores exactly the state that was suspended.
    pub fn suspend() -> ContextGuard {
        let guard = ContextGuard::install(None);
        debug!(depth = ?guard.captured_depth(), "ambient context suspended");
        guard
    }

    /// Apply every enricher in the current context to `event`.
    ///
    /// Enrichers run from the most recently pushed to the oldest, so with
    /// "add if absent" semantics the innermost value of a property wins.
    /// An absent or empty context adds nothing. A panicking enricher is
    /// logged and skipped; the remaining enrichers still run.
    pub fn enrich(event: &mut LogEvent, factory: &dyn PropertyFactory) {
        let Some(stack) = ACTIVE.get() else {
            return;
        };
        Self::enrich_from(&stack, event, factory);
    }

    pub(crate) fn enrich_from(
        stack: &ContextStack,
        event: &mut LogEvent,
        factory: &dyn PropertyFactory,
    ) {
        for enricher in stack {
            let applied = catch_unwind(AssertUnwindSafe(|| enricher.enrich(event, factory)));
            if applied.is_err() {
                warn!(enricher = ?enricher, "enricher panicked; skipping");
            }
        }
    }

    /// The current context stack, or `None` if absent or suspended.
    #[must_use]
    pub fn current() -> Option<ContextStack> {
        ACTIVE.get()
    }

    /// Number of enrichers in the current context.
    #[must_use]
    pub fn depth() -> usize {
        ACTIVE.get().map_or(0, |stack| stack.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enricher::enricher_fn;
    use crate::event::{Level, PropertyValue};
    use crate::factory::DefaultPropertyFactory;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn enriched() -> BTreeMap<String, PropertyValue> {
        let mut event = LogEvent::new(Level::Info, "test");
        LogContext::enrich(&mut event, &DefaultPropertyFactory::new());
        event.properties().clone()
    }

    fn scalar(value: Value) -> PropertyValue {
        PropertyValue::Scalar(value)
    }

    #[test]
    fn test_enrich_without_context_is_noop() {
        assert!(LogContext::current().is_none());
        assert!(enriched().is_empty());
    }

    #[test]
    fn test_end_to_end_request_scope() {
        let guard1 = LogContext::push_property("RequestId", "abc");
        let guard2 = LogContext::push_property("UserId", 42);

        let first = enriched();
        assert_eq!(first.len(), 2);
        assert_eq!(first["RequestId"], scalar(json!("abc")));
        assert_eq!(first["UserId"], scalar(json!(42)));

        drop(guard2);
        let second = enriched();
        assert_eq!(second.len(), 1);
        assert_eq!(second["RequestId"], scalar(json!("abc")));

        drop(guard1);
        assert!(enriched().is_empty());
    }

    #[test]
    fn test_innermost_value_wins() {
        let outer = LogContext::push_property("A", 1);
        let inner = LogContext::push_property("A", 2);
        assert_eq!(enriched()["A"], scalar(json!(2)));

        drop(inner);
        assert_eq!(enriched()["A"], scalar(json!(1)));
        drop(outer);
    }

    #[test]
    fn test_restore_exactness_over_many_pushes() {
        let base = LogContext::push_property("Base", true);
        let before = LogContext::current().unwrap();

        let guards: Vec<_> = (0..16)
            .map(|i| LogContext::push_property(format!("P{i}"), i))
            .collect();
        assert_eq!(LogContext::depth(), 17);

        for guard in guards.into_iter().rev() {
            drop(guard);
        }
        assert!(LogContext::current().unwrap().ptr_eq(&before));
        assert_eq!(enriched().len(), 1);
        drop(base);
    }

    #[test]
    fn test_first_push_captures_empty_stack() {
        let guard = LogContext::push_property("A", 1);
        assert_eq!(guard.captured_depth(), Some(0));
        drop(guard);
        assert!(LogContext::current().is_some_and(|stack| stack.is_empty()));
        assert!(enriched().is_empty());
    }

    #[test]
    fn test_push_properties_batch_undone_at_once() {
        let outer = LogContext::push_property("Outer", "x");
        let batch: Vec<SharedEnricher> = vec![
            Arc::new(PropertyEnricher::new("A", 1)),
            Arc::new(PropertyEnricher::new("B", 2)),
            Arc::new(PropertyEnricher::new("A", 3)),
        ];

        let guard = LogContext::push_properties(Some(batch.as_slice())).unwrap();
        assert_eq!(LogContext::depth(), 4);
        let properties = enriched();
        assert_eq!(properties["A"], scalar(json!(3)));
        assert_eq!(properties["B"], scalar(json!(2)));
        assert_eq!(properties["Outer"], scalar(json!("x")));

        drop(guard);
        assert_eq!(LogContext::depth(), 1);
        assert_eq!(enriched().len(), 1);
        drop(outer);
    }

    #[test]
    fn test_push_properties_accepts_empty_batch() {
        let guard = LogContext::push_properties(Some(&[][..])).unwrap();
        assert_eq!(LogContext::depth(), 0);
        drop(guard);
    }

    #[test]
    fn test_push_properties_rejects_absent() {
        let outer = LogContext::push_property("Outer", 1);
        let before = LogContext::current().unwrap();

        let result = LogContext::push_properties(None);
        assert!(matches!(result, Err(ContextError::InvalidArgument(_))));
        assert!(LogContext::current().unwrap().ptr_eq(&before));
        drop(outer);
    }

    #[test]
    fn test_suspend_round_trip() {
        let outer = LogContext::push_property("RequestId", "abc");
        let inner = LogContext::push_property("UserId", 7);

        let suspended = LogContext::suspend();
        assert!(LogContext::current().is_none());
        assert!(enriched().is_empty());
        assert_eq!(suspended.captured_depth(), Some(2));

        drop(suspended);
        let properties = enriched();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties["UserId"], scalar(json!(7)));

        drop(inner);
        drop(outer);
    }

    #[test]
    fn test_suspend_without_context() {
        let suspended = LogContext::suspend();
        assert!(enriched().is_empty());
        drop(suspended);
        assert!(LogContext::current().is_none());
    }

    #[test]
    fn test_push_while_suspended_starts_fresh() {
        let outer = LogContext::push_property("Hidden", 1);
        let suspended = LogContext::suspend();
        let visible = LogContext::push_property("Visible", 2);

        let properties = enriched();
        assert!(properties.contains_key("Visible"));
        assert!(!properties.contains_key("Hidden"));

        drop(visible);
        assert!(enriched().is_empty());
        drop(suspended);
        assert!(enriched().contains_key("Hidden"));
        drop(outer);
    }

    #[test]
    fn test_out_of_order_release_clobbers() {
        let first = LogContext::push_property("First", 1);
        let second = LogContext::push_property("Second", 2);

        drop(first);
        assert!(enriched().is_empty());

        // The later guard still writes back its own snapshot.
        drop(second);
        assert_eq!(enriched().len(), 1);
        assert!(enriched().contains_key("First"));
    }

    #[test]
    fn test_panicking_enricher_is_skipped() {
        let outer = LogContext::push_property("Kept", "yes");
        let bad = LogContext::push(enricher_fn("bad", |_, _| panic!("enricher failure")));
        let inner = LogContext::push_property("Inner", 1);

        let properties = enriched();
        assert!(properties.contains_key("Kept"));
        assert!(properties.contains_key("Inner"));

        drop(inner);
        drop(bad);
        drop(outer);
    }

    #[test]
    fn test_enricher_may_read_context() {
        let depth_seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = Arc::clone(&depth_seen);
        let guard = LogContext::push(enricher_fn("depth", move |_, _| {
            seen.store(LogContext::depth(), std::sync::atomic::Ordering::SeqCst);
        }));

        enriched();
        assert_eq!(depth_seen.load(std::sync::atomic::Ordering::SeqCst), 1);
        drop(guard);
    }

    #[test]
    fn test_push_destructured() {
        let guard = LogContext::push_destructured("User", json!({"id": 1, "name": "ana"}));
        let properties = enriched();
        let PropertyValue::Structure(fields) = &properties["User"] else {
            panic!("expected structure");
        };
        assert_eq!(fields["name"], scalar(json!("ana")));
        drop(guard);
    }

    #[test]
    fn test_existing_event_property_is_not_overridden() {
        let guard = LogContext::push_property("RequestId", "ambient");
        let mut event = LogEvent::new(Level::Info, "test");
        event.add_property_if_absent(crate::event::Property::new("RequestId", json!("explicit")));
        LogContext::enrich(&mut event, &DefaultPropertyFactory::new());
        assert_eq!(event.property("RequestId"), Some(&scalar(json!("explicit"))));
        drop(guard);
    }
}
