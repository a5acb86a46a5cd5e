//! Bridge from `tracing` events to ambient-enriched [`LogEvent`]s.

use std::cell::Cell;
use std::fmt;

use ambit_core::{DefaultPropertyFactory, LogContext, LogEvent, Property, PropertyFactory};
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::sink::EventSink;

/// What the layer is doing on the current thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Enriching,
    Emitting,
}

thread_local! {
    static PHASE: Cell<Phase> = const { Cell::new(Phase::Idle) };
}

/// Sets the thread's phase for the guard's lifetime.
struct PhaseGuard {
    previous: Phase,
}

impl PhaseGuard {
    fn enter(phase: Phase) -> Self {
        let previous = PHASE.try_with(|cell| cell.replace(phase)).unwrap_or(Phase::Emitting);
        Self { previous }
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        let _ = PHASE.try_with(|cell| cell.set(self.previous));
    }
}

fn current_phase() -> Phase {
    PHASE.try_with(Cell::get).unwrap_or(Phase::Emitting)
}

fn set_phase(phase: Phase) {
    let _ = PHASE.try_with(|cell| cell.set(phase));
}

/// A `tracing_subscriber` layer that decorates every event with the ambient
/// context and hands it to an [`EventSink`].
///
/// Fields recorded on the tracing event itself take precedence over ambient
/// properties of the same name.
///
/// Events raised while the ambient context is being applied (for example the
/// warning about a panicking enricher) are delivered to the sink as they are,
/// without ambient properties. Events raised from inside the sink are dropped.
pub struct AmbientLayer<S, F = DefaultPropertyFactory> {
    sink: S,
    factory: F,
}

impl<S: EventSink> AmbientLayer<S> {
    /// Create a layer with the default property factory.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            factory: DefaultPropertyFactory::new(),
        }
    }
}

impl<S: EventSink, F> AmbientLayer<S, F> {
    /// Replace the property factory.
    #[must_use]
    pub fn with_factory<G>(self, factory: G) -> AmbientLayer<S, G>
    where
        G: PropertyFactory + Send + Sync + 'static,
    {
        AmbientLayer {
            sink: self.sink,
            factory,
        }
    }

    /// The sink events are delivered to.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S, F> fmt::Debug for AmbientLayer<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientLayer").finish_non_exhaustive()
    }
}

impl<Sub, S, F> Layer<Sub> for AmbientLayer<S, F>
where
    Sub: Subscriber,
    S: EventSink,
    F: PropertyFactory + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, Sub>) {
        let enrich = match current_phase() {
            Phase::Idle => true,
            Phase::Enriching => false,
            Phase::Emitting => return,
        };
        let _phase = PhaseGuard::enter(Phase::Enriching);

        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut log_event = LogEvent::new((*metadata.level()).into(), visitor.message)
            .with_target(metadata.target());
        for (name, value) in visitor.fields {
            log_event.add_property_if_absent(Property::new(name, value));
        }

        if enrich {
            LogContext::enrich(&mut log_event, &self.factory);
        }
        set_phase(Phase::Emitting);
        self.sink.emit(&log_event);
    }
}

/// Collects the fields of a tracing event as JSON values.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, Value)>,
}

impl FieldVisitor {
    fn record(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
        } else {
            self.fields.push((field.name().to_owned(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, Value::String(format!("{value:?}")));
    }
}
