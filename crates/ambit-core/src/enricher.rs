//! Enrichers: the deferred units of work stored on the context stack.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{ContextError, ContextResult};
use crate::event::{LogEvent, Property};
use crate::factory::PropertyFactory;

/// Adds data to a log event at enrichment time.
///
/// Enrichers live on an immutable stack that may be shared between threads,
/// so they must be `Send + Sync` and must not rely on interior state changing
/// between calls.
pub trait Enricher: Send + Sync + fmt::Debug {
    /// Apply this enricher to `event`.
    fn enrich(&self, event: &mut LogEvent, factory: &dyn PropertyFactory);
}

/// Shared handle to an enricher.
pub type SharedEnricher = Arc<dyn Enricher>;

/// Adds a single named property unless the event already has one by that name.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEnricher {
    name: String,
    value: Value,
    destructure: bool,
}

impl PropertyEnricher {
    /// Create an enricher that adds `name = value` as a scalar.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            destructure: false,
        }
    }

    /// Capture any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidArgument`] if `value` cannot be
    /// represented as JSON (for example a map with non-string keys).
    pub fn serialize<T: Serialize + ?Sized>(
        name: impl Into<String>,
        value: &T,
    ) -> ContextResult<Self> {
        let name = name.into();
        let value = serde_json::to_value(value).map_err(|e| {
            ContextError::InvalidArgument(format!("property `{name}` is not serializable: {e}"))
        })?;
        Ok(Self {
            name,
            value,
            destructure: false,
        })
    }

    /// Ask the property factory to decompose composite values.
    #[must_use]
    pub fn destructured(mut self) -> Self {
        self.destructure = true;
        self
    }

    /// Set whether composite values are decomposed.
    #[must_use]
    pub fn with_destructure(mut self, destructure: bool) -> Self {
        self.destructure = destructure;
        self
    }

    /// Property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Captured value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the value is destructured.
    #[must_use]
    pub fn destructure(&self) -> bool {
        self.destructure
    }
}

impl Enricher for PropertyEnricher {
    fn enrich(&self, event: &mut LogEvent, factory: &dyn PropertyFactory) {
        if event.has_property(&self.name) {
            return;
        }
        event.add_property_if_absent(factory.create_property(
            &self.name,
            &self.value,
            self.destructure,
        ));
    }
}

/// Adds an already materialized property.
///
/// Used when ambient properties arrive from across a boundary in their
/// final form.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPropertyEnricher {
    property: Property,
}

impl FixedPropertyEnricher {
    /// Wrap a materialized property.
    #[must_use]
    pub fn new(property: Property) -> Self {
        Self { property }
    }
}

impl Enricher for FixedPropertyEnricher {
    fn enrich(&self, event: &mut LogEvent, _factory: &dyn PropertyFactory) {
        if !event.has_property(&self.property.name) {
            event.add_property_if_absent(self.property.clone());
        }
    }
}

/// Enricher backed by a closure. See [`enricher_fn`].
pub struct FnEnricher<F> {
    label: &'static str,
    f: F,
}

impl<F> fmt::Debug for FnEnricher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEnricher")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<F> Enricher for FnEnricher<F>
where
    F: Fn(&mut LogEvent, &dyn PropertyFactory) + Send + Sync,
{
    fn enrich(&self, event: &mut LogEvent, factory: &dyn PropertyFactory) {
        (self.f)(event, factory);
    }
}

/// Build an enricher from a closure, for values computed at log time.
///
/// `label` only shows up in `Debug` output.
///
/// ```
/// use ambit_core::{LogContext, PropertyFactory, enricher_fn};
///
/// let _guard = LogContext::push(enricher_fn("thread", |event, factory| {
///     let name = std::thread::current().name().unwrap_or("unnamed").to_string();
///     event.add_property_if_absent(factory.create_property("Thread", &name.into(), false));
/// }));
/// ```
pub fn enricher_fn<F>(label: &'static str, f: F) -> FnEnricher<F>
where
    F: Fn(&mut LogEvent, &dyn PropertyFactory) + Send + Sync,
{
    FnEnricher { label, f }
}
