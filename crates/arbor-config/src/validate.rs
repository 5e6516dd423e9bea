//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Longest accepted token lifetime (one day).
pub const MAX_TTL_SECS: u64 = 86_400;

/// Largest accepted verifier leeway.
pub const MAX_LEEWAY_SECS: u64 = 300;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 3] = ["pretty", "compact", "json"];
const VALID_TARGETS: [&str; 3] = ["stderr", "stdout", "file"];

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError::ValidationError`] found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_paths(config)?;
    validate_claims(config)?;
    Ok(())
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message,
    }
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    if !VALID_LEVELS.contains(&logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                logging.level,
                VALID_LEVELS.join(", ")
            ),
        ));
    }

    if !VALID_FORMATS.contains(&logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                logging.format,
                VALID_FORMATS.join(", ")
            ),
        ));
    }

    if !VALID_TARGETS.contains(&logging.target.as_str()) {
        return Err(invalid(
            "logging.target",
            format!(
                "unsupported log target '{}'; expected one of: {}",
                logging.target,
                VALID_TARGETS.join(", ")
            ),
        ));
    }

    if logging.target == "file" && logging.directory.is_none() {
        return Err(invalid(
            "logging.directory",
            "file logging requires a directory".to_owned(),
        ));
    }

    if logging.directives.iter().any(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directives",
            "directives must not be empty".to_owned(),
        ));
    }

    Ok(())
}

fn validate_paths(config: &Config) -> ConfigResult<()> {
    for (field, path) in [
        ("logging.directory", &config.logging.directory),
        ("catalog.path", &config.catalog.path),
        ("grants.path", &config.grants.path),
        ("claims.key_path", &config.claims.key_path),
    ] {
        if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(invalid(field, "path must not be empty".to_owned()));
        }
    }
    Ok(())
}

fn validate_claims(config: &Config) -> ConfigResult<()> {
    let claims = &config.claims;

    if claims.issuer.trim().is_empty() {
        return Err(invalid(
            "claims.issuer",
            "issuer must not be empty".to_owned(),
        ));
    }

    if !(1..=MAX_TTL_SECS).contains(&claims.ttl_secs) {
        return Err(invalid(
            "claims.ttl_secs",
            format!(
                "ttl {} is out of range; must be between 1 and {MAX_TTL_SECS}",
                claims.ttl_secs
            ),
        ));
    }

    if claims.leeway_secs > MAX_LEEWAY_SECS {
        return Err(invalid(
            "claims.leeway_secs",
            format!(
                "leeway {} exceeds the {MAX_LEEWAY_SECS} second maximum",
                claims.leeway_secs
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "full".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }

    #[test]
    fn test_log_target() {
        let mut config = Config::default();
        config.logging.target = "syslog".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.target");

        config.logging.target = "stdout".to_owned();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_file_target_requires_directory() {
        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.directory");

        config.logging.directory = Some(PathBuf::new());
        assert_eq!(field_of(validate(&config)), "logging.directory");

        config.logging.directory = Some(PathBuf::from("/var/log/arbor"));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_blank_directive() {
        let mut config = Config::default();
        config.logging.directives = vec!["arbor_resolver=debug".to_owned(), " ".to_owned()];
        assert_eq!(field_of(validate(&config)), "logging.directives");
    }

    #[test]
    fn test_empty_path() {
        let mut config = Config::default();
        config.grants.path = Some(PathBuf::new());
        assert_eq!(field_of(validate(&config)), "grants.path");
    }

    #[test]
    fn test_empty_issuer() {
        let mut config = Config::default();
        config.claims.issuer = "  ".to_owned();
        assert_eq!(field_of(validate(&config)), "claims.issuer");
    }

    #[test]
    fn test_ttl_bounds() {
        let mut config = Config::default();
        config.claims.ttl_secs = 0;
        assert_eq!(field_of(validate(&config)), "claims.ttl_secs");

        config.claims.ttl_secs = 86_401;
        assert_eq!(field_of(validate(&config)), "claims.ttl_secs");

        config.claims.ttl_secs = MAX_TTL_SECS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_leeway_bound() {
        let mut config = Config::default();
        config.claims.leeway_secs = MAX_LEEWAY_SECS;
        assert!(validate(&config).is_ok());

        config.claims.leeway_secs = 301;
        assert_eq!(field_of(validate(&config)), "claims.leeway_secs");
    }
}
