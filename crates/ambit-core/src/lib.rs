//! Ambit Core - Ambient, scope-bound property context for structured log events.
//!
//! This crate provides:
//! - An immutable, structurally shared context stack
//! - Scoped push/pop of log properties via [`ContextGuard`]
//! - Suspension of the ambient context
//! - Enrichment of log events from the current context
//! - Propagation of the context into forked threads and async tasks
//!
//! # Example
//!
//! ```rust
//! use ambit_core::{DefaultPropertyFactory, FlowExt, Level, LogContext, LogEvent};
//!
//! let request = LogContext::push_property("RequestId", "abc");
//!
//! // Futures handed to an executor take a fork of the context with them.
//! let task = async {
//!     let _user = LogContext::push_property("UserId", 42);
//!     let mut event = LogEvent::new(Level::Info, "loaded profile");
//!     LogContext::enrich(&mut event, &DefaultPropertyFactory::new());
//!     event
//! }
//! .in_current_flow();
//!
//! let event = futures::executor::block_on(task);
//! assert!(event.has_property("RequestId"));
//! assert!(event.has_property("UserId"));
//!
//! // The task's push never reached this flow.
//! assert_eq!(LogContext::depth(), 1);
//! drop(request);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod config;
pub mod context;
pub mod enricher;
pub mod envelope;
pub mod error;
pub mod event;
pub mod factory;
pub mod flow;
pub mod guard;
pub mod slot;
pub mod stack;

pub use config::ContextConfig;
pub use context::LogContext;
pub use enricher::{
    Enricher, FixedPropertyEnricher, FnEnricher, PropertyEnricher, SharedEnricher, enricher_fn,
};
pub use envelope::ContextEnvelope;
pub use error::{ContextError, ContextResult};
pub use event::{Level, LogEvent, Property, PropertyValue};
pub use factory::{DefaultPropertyFactory, PropertyFactory};
pub use flow::{Flow, FlowExt, WithFlow};
pub use guard::ContextGuard;
pub use slot::{AmbientSlot, ContextStack, ThreadSlot};
pub use stack::PersistentStack;
