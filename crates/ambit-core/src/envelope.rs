//! Hand-off of ambient properties across an isolation boundary.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::ContextConfig;
use crate::context::LogContext;
use crate::enricher::{FixedPropertyEnricher, SharedEnricher};
use crate::event::{Level, LogEvent, Property};
use crate::factory::PropertyFactory;
use crate::guard::ContextGuard;

/// Materialized ambient properties, ready to cross a boundary.
///
/// Enrichers themselves never cross: [`capture`](Self::capture) runs them
/// once on the sending side and keeps only the resulting properties. Whether
/// anything is captured at all is controlled by
/// [`ContextConfig::allow_cross_boundary`]; when it is off the envelope is
/// always empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextEnvelope {
    properties: Vec<Property>,
}

impl ContextEnvelope {
    /// Capture the calling flow's effective properties.
    #[must_use]
    pub fn capture(config: &ContextConfig, factory: &dyn PropertyFactory) -> Self {
        if !config.allow_cross_boundary {
            if LogContext::depth() > 0 {
                debug!("cross-boundary context disabled; ambient properties dropped");
            }
            return Self::default();
        }

        let mut scratch = LogEvent::new(Level::Trace, String::new());
        LogContext::enrich(&mut scratch, factory);
        let properties: Vec<Property> = scratch
            .properties()
            .iter()
            .map(|(name, value)| Property::new(name.clone(), value.clone()))
            .collect();
        debug!(count = properties.len(), "ambient context captured for hand-off");
        Self { properties }
    }

    /// Build an envelope from explicit properties.
    #[must_use]
    pub fn from_properties(properties: Vec<Property>) -> Self {
        Self { properties }
    }

    /// Push the carried properties into the receiving flow as one batch.
    pub fn enter(self) -> ContextGuard {
        LogContext::push_enrichers(
            self.properties
                .into_iter()
                .map(|property| Arc::new(FixedPropertyEnricher::new(property)) as SharedEnricher),
        )
    }

    /// Carried properties.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Whether nothing is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Number of carried properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PropertyValue;
    use crate::factory::DefaultPropertyFactory;
    use crate::flow::Flow;
    use serde_json::json;

    #[test]
    fn test_disabled_by_default() {
        let _guard = LogContext::push_property("Secret", "value");
        let envelope =
            ContextEnvelope::capture(&ContextConfig::default(), &DefaultPropertyFactory::new());
        assert!(envelope.is_empty());
    }

    #[test]
    fn test_captures_effective_properties() {
        let config = ContextConfig::default().allowing_cross_boundary();
        let _outer = LogContext::push_property("A", 1);
        let _inner = LogContext::push_property("A", 2);
        let _other = LogContext::push_property("B", "b");

        let envelope = ContextEnvelope::capture(&config, &DefaultPropertyFactory::new());
        assert_eq!(envelope.len(), 2);
        assert!(
            envelope
                .properties()
                .contains(&Property::new("A", json!(2)))
        );
    }

    #[test]
    fn test_suspended_context_captures_nothing() {
        let config = ContextConfig::default().allowing_cross_boundary();
        let _outer = LogContext::push_property("A", 1);
        let _suspended = LogContext::suspend();
        let envelope = ContextEnvelope::capture(&config, &DefaultPropertyFactory::new());
        assert!(envelope.is_empty());
    }

    #[test]
    fn test_enter_on_receiving_side() {
        let config = ContextConfig::default().allowing_cross_boundary();
        let sender = LogContext::push_destructured("User", json!({"id": 3}));
        let envelope = ContextEnvelope::capture(&config, &DefaultPropertyFactory::new());
        drop(sender);

        let wire = serde_json::to_string(&envelope).unwrap();
        let received: ContextEnvelope = serde_json::from_str(&wire).unwrap();
        assert_eq!(received, envelope);

        let properties = Flow::detached().scope(|| {
            let _guard = received.enter();
            let mut event = LogEvent::new(Level::Info, "remote");
            LogContext::enrich(&mut event, &DefaultPropertyFactory::new());
            event.properties().clone()
        });
        assert!(matches!(properties["User"], PropertyValue::Structure(_)));
        assert_eq!(LogContext::depth(), 0);
    }
}
