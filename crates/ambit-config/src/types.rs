//! Configuration struct definitions.
//!
//! These are plain data. Conversion into runtime types (`ContextConfig`,
//! `LogConfig`) happens in `ambit-telemetry` behind its `config` feature.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ambient-context behaviour.
    pub context: ContextSection,
    /// Logging output.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// ContextSection
// ---------------------------------------------------------------------------

/// Ambient-context settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSection {
    /// Allow ambient properties to be exported across an isolation boundary.
    pub allow_cross_boundary: bool,
    /// Nesting limit when destructuring composite property values.
    pub max_destructure_depth: usize,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            allow_cross_boundary: false,
            max_destructure_depth: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Output target: `"stdout"`, `"stderr"` or `"file"`.
    pub target: String,
    /// Log directory, required when `target = "file"`.
    pub directory: Option<PathBuf>,
    /// File name prefix for rolling log files.
    pub file_prefix: String,
    /// Rotation for rolling log files: `"daily"`, `"hourly"`, `"minutely"` or `"never"`.
    pub rotation: String,
    /// Whether to use ANSI colors.
    pub ansi: bool,
    /// Write ambient-enriched JSON lines in place of the `format` output.
    pub ambient_json: bool,
    /// Per-crate directives (e.g. `["ambit_core=trace"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            target: "stderr".to_owned(),
            directory: None,
            file_prefix: "ambit".to_owned(),
            rotation: "daily".to_owned(),
            ansi: true,
            ambient_json: false,
            directives: Vec::new(),
        }
    }
}
