//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the config file (explicit path, else `AMBIT_CONFIG`)
//! 3. Deserialize merged tree → `Config`
//! 4. Apply `AMBIT_*` environment overrides
//! 5. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "AMBIT_CONFIG";
/// Environment override for `logging.level`.
pub const ENV_LOG_LEVEL: &str = "AMBIT_LOG_LEVEL";
/// Environment override for `logging.format`.
pub const ENV_LOG_FORMAT: &str = "AMBIT_LOG_FORMAT";
/// Environment override for `context.allow_cross_boundary`.
pub const ENV_ALLOW_CROSS_BOUNDARY: &str = "AMBIT_ALLOW_CROSS_BOUNDARY";

/// Snapshot the `AMBIT_*` environment variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with("AMBIT_"))
        .collect()
}

/// Load configuration using the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, an
/// override cannot be parsed, or the result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
    load_with_env(path, &collect_env_vars())
}

/// Load configuration against an explicit environment map.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(path: Option<&Path>, env: &HashMap<String, String>) -> ConfigResult<Config> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    // 2. Config file. An explicitly named file must exist.
    let file = path
        .map(Path::to_path_buf)
        .or_else(|| env.get(ENV_CONFIG_PATH).map(PathBuf::from));
    if let Some(file) = file {
        let overlay = read_file(&file)?;
        deep_merge(&mut merged, &overlay);
        info!(path = %file.display(), "loaded config file");
    } else {
        debug!("no config file given, using defaults");
    }

    // 3. Deserialize.
    let mut config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;

    // 4. Environment overrides.
    apply_env_overrides(&mut config, env)?;

    // 5. Validate.
    validate::validate(&config)?;
    Ok(config)
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    // Size is checked before reading so an oversized file is never loaded.
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                metadata.len()
            ),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Recursively deep-merge `overlay` into `base`.
///
/// Tables merge per field; scalars and arrays from the overlay replace the
/// base value.
fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

fn apply_env_overrides(config: &mut Config, env: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(level) = env.get(ENV_LOG_LEVEL) {
        config.logging.level = level.trim().to_lowercase();
    }
    if let Some(format) = env.get(ENV_LOG_FORMAT) {
        config.logging.format = format.trim().to_lowercase();
    }
    if let Some(value) = env.get(ENV_ALLOW_CROSS_BOUNDARY) {
        config.context.allow_cross_boundary = parse_bool(ENV_ALLOW_CROSS_BOUNDARY, value)?;
    }
    Ok(())
}

fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvError {
            var: var.to_owned(),
            value: value.to_owned(),
        }),
    }
}
