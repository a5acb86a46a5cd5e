//! Conversion of captured values into structured properties.

use serde_json::Value;

use crate::config::ContextConfig;
use crate::event::{Property, PropertyValue};

/// Default nesting limit for destructured values.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Materializes structured properties from captured values.
///
/// Implementations must convert `value` to a scalar when `destructure` is
/// false or the value is primitive, and may decompose composite values into
/// sequences and structures when `destructure` is true.
pub trait PropertyFactory {
    /// Create a property named `name` from `value`.
    fn create_property(&self, name: &str, value: &Value, destructure: bool) -> Property;
}

/// The standard property factory.
///
/// Composite values that are not destructured are rendered as their compact
/// JSON text. Destructuring stops at `max_depth`; anything nested deeper is
/// rendered as text as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPropertyFactory {
    max_depth: usize,
}

impl DefaultPropertyFactory {
    /// Create a factory with the default depth limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the destructuring depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Create a factory using the limits from a [`ContextConfig`].
    #[must_use]
    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new().with_max_depth(config.max_destructure_depth)
    }

    /// The destructuring depth limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn convert(&self, value: &Value, destructure: bool, depth: usize) -> PropertyValue {
        let within_limit = depth < self.max_depth;
        match value {
            Value::Array(items) if destructure && within_limit => PropertyValue::Sequence(
                items
                    .iter()
                    .map(|item| self.convert(item, true, depth.saturating_add(1)))
                    .collect(),
            ),
            Value::Object(fields) if destructure && within_limit => PropertyValue::Structure(
                fields
                    .iter()
                    .map(|(name, field)| {
                        (
                            name.clone(),
                            self.convert(field, true, depth.saturating_add(1)),
                        )
                    })
                    .collect(),
            ),
            Value::Array(_) | Value::Object(_) => {
                PropertyValue::Scalar(Value::String(value.to_string()))
            },
            primitive => PropertyValue::Scalar(primitive.clone()),
        }
    }
}

impl Default for DefaultPropertyFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyFactory for DefaultPropertyFactory {
    fn create_property(&self, name: &str, value: &Value, destructure: bool) -> Property {
        Property::new(name, self.convert(value, destructure, 0))
    }
}
