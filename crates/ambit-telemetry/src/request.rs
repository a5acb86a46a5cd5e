//! Request context for correlation, pushed into the ambient log context.

use ambit_core::{ContextGuard, LogContext, PropertyEnricher, SharedEnricher};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Request context for correlation across operations.
///
/// Entering it pushes the identifiers onto the ambient log context, so every
/// event logged inside the request carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: Uuid,
    /// Correlation ID shared by related requests.
    pub correlation_id: Uuid,
    /// Parent request ID if this is a sub-request.
    pub parent_id: Option<Uuid>,
    /// When the request started.
    pub started_at: DateTime<Utc>,
    /// Component that created this context.
    pub source: String,
    /// Operation being performed.
    pub operation: Option<String>,
    /// Additional properties, pushed alongside the identifiers.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RequestContext {
    /// Create a new request context.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            request_id: id,
            correlation_id: id,
            parent_id: None,
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Create a child context that inherits correlation info and metadata.
    #[must_use]
    pub fn child(&self, source: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            correlation_id: self.correlation_id,
            parent_id: Some(self.request_id),
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            metadata: self.metadata.clone(),
        }
    }

    /// Set the correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = id;
        self
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Add metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Elapsed time in milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        // Utc::now() >= self.started_at by construction
        #[allow(clippy::arithmetic_side_effects)]
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_milliseconds()
    }

    /// First eight characters of the request ID.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string().chars().take(8).collect()
    }

    /// The enrichers this context contributes, bottom first.
    #[must_use]
    pub fn enrichers(&self) -> Vec<SharedEnricher> {
        let mut enrichers: Vec<SharedEnricher> = self
            .metadata
            .iter()
            .map(|(key, value)| {
                Arc::new(PropertyEnricher::new(key.clone(), value.clone())) as SharedEnricher
            })
            .collect();

        enrichers.push(Arc::new(PropertyEnricher::new("Source", self.source.clone())));
        if let Some(operation) = &self.operation {
            enrichers.push(Arc::new(PropertyEnricher::new("Operation", operation.clone())));
        }
        if let Some(parent) = self.parent_id {
            enrichers.push(Arc::new(PropertyEnricher::new(
                "ParentRequestId",
                parent.to_string(),
            )));
        }
        enrichers.push(Arc::new(PropertyEnricher::new(
            "CorrelationId",
            self.correlation_id.to_string(),
        )));
        enrichers.push(Arc::new(PropertyEnricher::new(
            "RequestId",
            self.request_id.to_string(),
        )));
        enrichers
    }

    /// Push this context onto the ambient log context.
    pub fn enter(self) -> RequestGuard {
        let ambient = LogContext::push_enrichers(self.enrichers());
        tracing::debug!(source = %self.source, "request started");
        RequestGuard {
            context: self,
            ambient: Some(ambient),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

/// Keeps a request's properties in the ambient context and logs completion.
#[must_use = "dropping the guard immediately ends the request scope"]
#[derive(Debug)]
pub struct RequestGuard {
    context: RequestContext,
    ambient: Option<ContextGuard>,
}

impl RequestGuard {
    /// Get the request context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        // Logged while the request's properties are still in place.
        tracing::debug!(elapsed_ms = self.context.elapsed_ms(), "request completed");
        drop(self.ambient.take());
    }
}
