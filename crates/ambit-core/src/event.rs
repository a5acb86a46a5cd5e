//! Log events and the structured properties attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Very fine-grained diagnostics.
    Trace,
    /// Debugging information.
    Debug,
    /// Normal operational messages.
    #[default]
    Info,
    /// Something unexpected that did not stop the operation.
    Warn,
    /// A failed operation.
    Error,
}

impl Level {
    /// Lowercase name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            _ => Self::Error,
        }
    }
}

/// The materialized value of a structured property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    /// A single value (string, number, bool or null).
    Scalar(Value),
    /// An ordered collection of values.
    Sequence(Vec<PropertyValue>),
    /// A named set of fields.
    Structure(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Render as plain JSON, dropping the scalar/structure distinction.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Structure(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// The scalar payload, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

/// A named datum attached to a log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name. Names are unique within an event.
    pub name: String,
    /// Materialized value.
    pub value: PropertyValue,
}

impl Property {
    /// Create a new property.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A log event as seen by enrichers.
///
/// Properties are keyed by name; at most one property per name is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: Level,
    /// Emitting component (module path for tracing events).
    #[serde(default)]
    pub target: String,
    /// Rendered message.
    pub message: String,
    #[serde(default)]
    properties: BTreeMap<String, PropertyValue>,
}

impl LogEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            target: String::new(),
            message: message.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a property unless one with the same name already exists.
    ///
    /// Returns `true` if the property was added.
    pub fn add_property_if_absent(&mut self, property: Property) -> bool {
        if self.properties.contains_key(&property.name) {
            return false;
        }
        self.properties.insert(property.name, property.value);
        true
    }

    /// Add a property, replacing any existing value with the same name.
    pub fn add_or_update_property(&mut self, property: Property) {
        self.properties.insert(property.name, property.value);
    }

    /// Remove a property by name.
    pub fn remove_property(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.remove(name)
    }

    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Whether a property with this name exists.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// All properties, ordered by name.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    /// Flatten into a single JSON object for line-oriented sinks.
    ///
    /// Properties are nested under `"properties"` so they can never shadow
    /// the envelope fields.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();

        let mut object = Map::new();
        object.insert("timestamp".to_string(), Value::String(self.timestamp.to_rfc3339()));
        object.insert("level".to_string(), Value::String(self.level.to_string()));
        object.insert("target".to_string(), Value::String(self.target.clone()));
        object.insert("message".to_string(), Value::String(self.message.clone()));
        object.insert("properties".to_string(), Value::Object(properties));
        Value::Object(object)
    }
}
