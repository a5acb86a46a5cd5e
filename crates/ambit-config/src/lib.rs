#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Unified configuration for Ambit.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ambit_config::Config;
//!
//! // Defaults → config file (explicit path or `AMBIT_CONFIG`) → `AMBIT_*` env.
//! let config = Config::load(None).unwrap();
//! println!("cross-boundary context: {}", config.context.allow_cross_boundary);
//! ```
//!
//! # Design
//!
//! This crate has **no dependencies on other internal ambit crates**.
//! Conversion to runtime types happens in `ambit-telemetry` (feature
//! `config`).

/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a file is malformed or the final
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }

    /// Parse a TOML string on top of the embedded defaults, without consulting
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the string is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_owned(),
            source: e,
        })?;
        validate::validate(&config)?;
        Ok(config)
    }
}
