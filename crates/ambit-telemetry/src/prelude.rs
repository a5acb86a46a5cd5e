//! Prelude module - commonly used types for convenient import.
//!
//! Use `use ambit_telemetry::prelude::*;` to import all essential types.

// Errors
pub use crate::{TelemetryError, TelemetryResult};

// Logging setup
pub use crate::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};

// Ambient bridge
pub use crate::{AmbientLayer, EventSink, JsonLinesSink, MemorySink};

// Request correlation
pub use crate::{RequestContext, RequestGuard};
