//! Application configuration structures.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collector::CollectorConfig;

use super::validation::{ConfigError, expand_env_vars, validate_listen, validate_url};

/// Default bind address of the mock servers.
pub const DEFAULT_SERVER_BIND: &str = "0.0.0.0";

/// Default port of the mock servers.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// Server Configuration
// =============================================================================

/// Mock server listen configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 8080).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_SERVER_BIND.to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

impl ServerConfig {
    /// Resolve the listen address.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if `bind` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind.parse().map_err(|_| {
            ConfigError::ValidationError(format!("invalid bind address: '{}'", self.bind))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Collection engine and transport configuration.
    pub collector: CollectorConfig,

    /// Mock source server.
    pub source_server: ServerConfig,

    /// Mock sink server.
    pub sink_server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references in the collector URLs are
    /// expanded before validation.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    /// Returns `ConfigError` if the text cannot be parsed or validated.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        let mut config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.expand_env();
        config.validate()?;
        Ok(config)
    }

    fn expand_env(&mut self) {
        self.collector.source_base_url = expand_env_vars(&self.collector.source_base_url);
        self.collector.sink_url = expand_env_vars(&self.collector.sink_url);
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector.source_count == 0 {
            return Err(ConfigError::ValidationError(
                "collector source_count must be positive".to_string(),
            ));
        }
        if u32::try_from(self.collector.source_count).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "collector source_count {} is too large",
                self.collector.source_count
            )));
        }

        validate_url("collector source_base_url", &self.collector.source_base_url)?;
        validate_url("collector sink_url", &self.collector.sink_url)?;

        validate_listen(
            "source_server",
            &self.source_server.bind,
            self.source_server.port,
        )?;
        validate_listen("sink_server", &self.sink_server.bind, self.sink_server.port)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.collector.source_count, 3);
    }

    #[test]
    fn test_from_yaml_full() {
        let yaml = r#"
collector:
  source_count: 4
  poll_interval: 2s
  max_concurrent: 2
  source_base_url: http://127.0.0.1:9000
  sink_url: http://127.0.0.1:9001/image
  request_timeout: 500ms
source_server:
  bind: 127.0.0.1
  port: 9000
sink_server:
  port: 9001
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.collector.source_count, 4);
        assert_eq!(config.collector.poll_interval, Duration::from_secs(2));
        assert_eq!(config.collector.max_concurrent, 2);
        assert_eq!(config.collector.request_timeout, Duration::from_millis(500));
        assert_eq!(config.source_server.bind, "127.0.0.1");
        assert_eq!(config.source_server.port, 9000);
        assert_eq!(config.sink_server.bind, "0.0.0.0");
        assert_eq!(config.sink_server.port, 9001);
    }

    #[test]
    fn test_from_yaml_empty_is_default() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_from_yaml_expands_env_vars() {
        let yaml = r#"
collector:
  source_base_url: http://${NONEXISTENT_RELAY_CAMERA_HOST:-camera-1}
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.collector.source_base_url, "http://camera-1");
    }

    #[test]
    fn test_validation_rejects_zero_sources() {
        let yaml = "collector:\n  source_count: 0\n";
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("source_count must be positive"));
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.collector.sink_url = "not a url".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sink_url"));
    }

    #[test]
    fn test_validation_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.sink_server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bind_hostname() {
        let mut config = AppConfig::default();
        config.source_server.bind = "localhost".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid source_server bind address"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "collector:\n  source_count: 2\n  poll_interval: 1s").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.collector.source_count, 2);
        assert_eq!(config.collector.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "collector: [unclosed").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
