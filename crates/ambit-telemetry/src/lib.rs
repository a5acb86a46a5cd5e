//! Ambit Telemetry - Logging setup and the `tracing` bridge for the ambient
//! log context.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats
//! - A `tracing_subscriber` layer that decorates events with ambient properties
//! - Request context for correlation across operations
//!
//! # Example
//!
//! ```rust,no_run
//! use ambit_telemetry::{LogConfig, RequestContext, setup_logging};
//!
//! # fn main() -> Result<(), ambit_telemetry::TelemetryError> {
//! // Every event becomes a JSON line carrying the ambient properties
//! let config = LogConfig::new("debug")
//!     .with_ambient_json()
//!     .with_directive("ambit_core=trace");
//!
//! setup_logging(&config)?;
//!
//! let _request = RequestContext::new("my_component")
//!     .with_operation("process_request")
//!     .enter();
//! tracing::info!("Processing request");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

#[cfg(feature = "config")]
pub mod bridge;

mod error;
mod layer;
mod logging;
mod request;
mod sink;

pub use error::{TelemetryError, TelemetryResult};
pub use layer::AmbientLayer;
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
pub use request::{RequestContext, RequestGuard};
pub use sink::{EventSink, JsonLinesSink, MemorySink};
