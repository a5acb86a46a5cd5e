//! Ambient-context configuration.

use serde::{Deserialize, Serialize};

use crate::factory::DEFAULT_MAX_DEPTH;

/// Settings that govern how ambient context is materialized and handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Whether ambient properties may be exported across an isolation
    /// boundary through a [`ContextEnvelope`](crate::ContextEnvelope).
    ///
    /// Off by default: exported envelopes are empty.
    #[serde(default)]
    pub allow_cross_boundary: bool,
    /// Maximum nesting depth when destructuring composite values.
    #[serde(default = "default_max_depth")]
    pub max_destructure_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            allow_cross_boundary: false,
            max_destructure_depth: default_max_depth(),
        }
    }
}

impl ContextConfig {
    /// Permit envelopes to carry ambient properties across a boundary.
    #[must_use]
    pub fn allowing_cross_boundary(mut self) -> Self {
        self.allow_cross_boundary = true;
        self
    }

    /// Set the destructuring depth limit.
    #[must_use]
    pub fn with_max_destructure_depth(mut self, depth: usize) -> Self {
        self.max_destructure_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_drops_cross_boundary_data() {
        let config = ContextConfig::default();
        assert!(!config.allow_cross_boundary);
        assert_eq!(config.max_destructure_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ContextConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ContextConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = ContextConfig::default()
            .allowing_cross_boundary()
            .with_max_destructure_depth(4);
        assert!(config.allow_cross_boundary);
        assert_eq!(config.max_destructure_depth, 4);
    }
}
