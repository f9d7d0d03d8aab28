//! Configuration validation utilities.

use std::net::IpAddr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Parse duration string using humantime.
///
/// Supports various formats: `30s`, `1m`, `5m30s`, `1h`, `100ms`, etc.
///
/// # Examples
///
/// ```
/// use snapshot_relay::config::parse_duration;
///
/// assert_eq!(parse_duration("5s").unwrap().as_secs(), 5);
/// assert_eq!(parse_duration("250ms").unwrap().as_millis(), 250);
/// assert_eq!(parse_duration("1m30s").unwrap().as_secs(), 90);
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("duration string is empty".to_string());
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

static ENV_VAR_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").ok());

/// Expand environment variables in a string.
/// Supports `${VAR}` and `${VAR:-default}` syntax; unset variables without
/// a default expand to the empty string.
pub fn expand_env_vars(input: &str) -> String {
    let Some(regex) = ENV_VAR_REGEX.as_ref() else {
        return input.to_string();
    };

    regex
        .replace_all(input, |caps: &Captures| {
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(&caps[1]).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

/// Check that `value` is an absolute URL.
pub(crate) fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value).map(|_| ()).map_err(|e| {
        ConfigError::ValidationError(format!("invalid {field} '{value}': {e}"))
    })
}

/// Check that a server bind address and port are usable.
pub(crate) fn validate_listen(section: &str, bind: &str, port: u16) -> Result<(), ConfigError> {
    bind.parse::<IpAddr>().map_err(|_| {
        ConfigError::ValidationError(format!("invalid {section} bind address: '{bind}'"))
    })?;

    if port == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{section} port must be non-zero"
        )));
    }
    Ok(())
}
