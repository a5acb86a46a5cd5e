//! Destinations for enriched log events.

use std::io::Write;
use std::sync::{Arc, Mutex};

use ambit_core::LogEvent;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::TelemetryResult;

/// Receives every event after ambient enrichment.
///
/// Sinks are called from inside the tracing pipeline and must not panic.
pub trait EventSink: Send + Sync + 'static {
    /// Deliver one event.
    fn emit(&self, event: &LogEvent);
}

/// Writes one JSON object per line.
///
/// Each line is encoded in full before a single `write_all`, so concurrent
/// emitters never interleave within a line.
pub struct JsonLinesSink<W> {
    make_writer: W,
}

impl<W> JsonLinesSink<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    /// Create a sink over any `tracing_subscriber` writer factory
    /// (`std::io::stdout`, a rolling file appender, ...).
    #[must_use]
    pub fn new(make_writer: W) -> Self {
        Self { make_writer }
    }

    /// Encode and write `event`, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn try_emit(&self, event: &LogEvent) -> TelemetryResult<()> {
        let mut line = serde_json::to_vec(&event.to_json())?;
        line.push(b'\n');
        let mut writer = self.make_writer.make_writer();
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W> EventSink for JsonLinesSink<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fn emit(&self, event: &LogEvent) {
        // Nowhere to report a failing log sink without recursing into it.
        let _ = self.try_emit(event);
    }
}

impl<W> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

/// Collects events in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event received so far.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Remove and return every event received so far.
    pub fn take(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    /// Number of events received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map_or(0, |events| events.len())
    }

    /// Whether no events were received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
