//! Bridge from `ambit_config::Config` to runtime types.
//!
//! The config crate has no dependencies on other internal crates, so the
//! conversion lives here. Inputs are expected to have passed
//! `ambit_config::validate`; unknown strings fall back to the defaults.

use ambit_config::Config;
use ambit_core::ContextConfig;

use crate::logging::{FileRotation, LogConfig, LogFormat, LogTarget};

/// Convert config to [`ContextConfig`].
#[must_use]
pub fn to_context_config(cfg: &Config) -> ContextConfig {
    ContextConfig {
        allow_cross_boundary: cfg.context.allow_cross_boundary,
        max_destructure_depth: cfg.context.max_destructure_depth,
    }
}

/// Convert config to [`LogConfig`].
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let logging = &cfg.logging;

    let format = match logging.format.as_str() {
        "compact" => LogFormat::Compact,
        "json" => LogFormat::Json,
        "full" => LogFormat::Full,
        _ => LogFormat::Pretty,
    };

    let rotation = match logging.rotation.as_str() {
        "hourly" => FileRotation::Hourly,
        "minutely" => FileRotation::Minutely,
        "never" => FileRotation::Never,
        _ => FileRotation::Daily,
    };

    let mut log_config = LogConfig::new(&logging.level).with_format(format);
    log_config.max_destructure_depth = cfg.context.max_destructure_depth;

    match (logging.target.as_str(), &logging.directory) {
        ("file", Some(directory)) => {
            log_config =
                log_config.with_file_logging(directory, &logging.file_prefix, rotation);
        },
        ("stdout", _) => log_config = log_config.with_target(LogTarget::Stdout),
        _ => log_config = log_config.with_target(LogTarget::Stderr),
    }

    if !logging.ansi {
        log_config = log_config.without_ansi();
    }
    if logging.ambient_json {
        log_config = log_config.with_ambient_json();
    }
    for directive in &logging.directives {
        log_config = log_config.with_directive(directive);
    }

    log_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_converts_to_defaults() {
        let cfg = Config::default();

        assert_eq!(to_context_config(&cfg), ContextConfig::default());

        let log = to_log_config(&cfg);
        assert_eq!(log.level, "info");
        assert_eq!(log.format, LogFormat::Pretty);
        assert_eq!(log.target, LogTarget::Stderr);
        assert!(log.ansi);
        assert!(!log.ambient_json);
    }

    #[test]
    fn test_context_section_is_carried_over() {
        let cfg = Config::from_toml_str(
            "[context]\nallow_cross_boundary = true\nmax_destructure_depth = 3\n",
        )
        .unwrap();

        let context = to_context_config(&cfg);
        assert!(context.allow_cross_boundary);
        assert_eq!(context.max_destructure_depth, 3);
        assert_eq!(to_log_config(&cfg).max_destructure_depth, 3);
    }

    #[test]
    fn test_file_target_with_rotation() {
        let cfg = Config::from_toml_str(
            r#"
            [logging]
            level = "debug"
            format = "json"
            target = "file"
            directory = "/var/log/ambit"
            file_prefix = "svc"
            rotation = "hourly"
            ambient_json = true
            directives = ["ambit_core=trace"]
            "#,
        )
        .unwrap();

        let log = to_log_config(&cfg);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.target, LogTarget::File(PathBuf::from("/var/log/ambit")));
        assert_eq!(log.file.prefix, "svc");
        assert_eq!(log.file.rotation, FileRotation::Hourly);
        assert!(!log.ansi);
        assert!(log.ambient_json);
        assert_eq!(log.directives, vec!["ambit_core=trace"]);
    }

    #[test]
    fn test_stdout_without_ansi() {
        let cfg =
            Config::from_toml_str("[logging]\ntarget = \"stdout\"\nansi = false\n").unwrap();

        let log = to_log_config(&cfg);
        assert_eq!(log.target, LogTarget::Stdout);
        assert!(!log.ansi);
    }
}
