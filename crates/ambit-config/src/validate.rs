//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound for `context.max_destructure_depth`.
pub const MAX_DESTRUCTURE_DEPTH: usize = 64;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_context(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_context(config: &Config) -> ConfigResult<()> {
    let depth = config.context.max_destructure_depth;
    if depth == 0 || depth > MAX_DESTRUCTURE_DEPTH {
        return Err(ConfigError::ValidationError {
            field: "context.max_destructure_depth".to_owned(),
            message: format!("must be between 1 and {MAX_DESTRUCTURE_DEPTH}, got {depth}"),
        });
    }
    Ok(())
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> ConfigResult<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        field: field.to_owned(),
        message: format!(
            "unsupported value '{value}'; expected one of: {}",
            allowed.join(", ")
        ),
    })
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    one_of(
        "logging.level",
        &logging.level,
        &["trace", "debug", "info", "warn", "error"],
    )?;
    one_of(
        "logging.format",
        &logging.format,
        &["pretty", "compact", "json", "full"],
    )?;
    one_of("logging.target", &logging.target, &["stdout", "stderr", "file"])?;
    one_of(
        "logging.rotation",
        &logging.rotation,
        &["daily", "hourly", "minutely", "never"],
    )?;

    if logging.target == "file" && logging.directory.is_none() {
        return Err(ConfigError::ValidationError {
            field: "logging.directory".to_owned(),
            message: "required when logging.target is \"file\"".to_owned(),
        });
    }

    if logging.file_prefix.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.file_prefix".to_owned(),
            message: "must not be empty".to_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_zero_depth() {
        let mut config = Config::default();
        config.context.max_destructure_depth = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("context.max_destructure_depth"));
    }

    #[test]
    fn test_rejects_excessive_depth() {
        let mut config = Config::default();
        config.context.max_destructure_depth = MAX_DESTRUCTURE_DEPTH.saturating_add(1);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_unknown_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_file_target_requires_directory() {
        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        assert!(validate(&config).is_err());

        config.logging.directory = Some("logs".into());
        assert!(validate(&config).is_ok());
    }
}
