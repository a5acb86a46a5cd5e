//! Prelude module - commonly used types for convenient import.
//!
//! Use `use ambit_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{ContextError, ContextResult};

// Context surface
pub use crate::{ContextGuard, LogContext};

// Enrichment
pub use crate::{
    DefaultPropertyFactory, Enricher, LogEvent, Property, PropertyEnricher, PropertyFactory,
    PropertyValue,
};

// Propagation
pub use crate::{ContextConfig, ContextEnvelope, Flow, FlowExt};
