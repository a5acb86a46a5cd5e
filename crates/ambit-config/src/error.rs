//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path of the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid TOML or does not match the schema.
    #[error("failed to parse config {path}: {source}")]
    ParseError {
        /// Path of the file, or `<embedded defaults>`.
        path: String,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// An environment override could not be interpreted.
    #[error("invalid value for {var}: {value:?}")]
    EnvError {
        /// Variable name.
        var: String,
        /// Offending value.
        value: String,
    },

    /// A value is outside its allowed range.
    #[error("invalid config field {field}: {message}")]
    ValidationError {
        /// Dotted field path.
        field: String,
        /// Description of the problem.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
