//! Collector configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Poll interval used when none is configured (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Per-call timeout for fetch and send (5 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of sources when none is configured.
pub const DEFAULT_SOURCE_COUNT: usize = 3;

/// Default source base URL.
pub const DEFAULT_SOURCE_BASE_URL: &str = "http://camera";

/// Default sink URL.
pub const DEFAULT_SINK_URL: &str = "http://target:8080/image";

fn default_source_count() -> usize {
    DEFAULT_SOURCE_COUNT
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_source_base_url() -> String {
    DEFAULT_SOURCE_BASE_URL.to_string()
}

fn default_sink_url() -> String {
    DEFAULT_SINK_URL.to_string()
}

/// Configuration of the collection engine and its default transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Number of sources to poll; ids run from 1 to this value.
    #[serde(default = "default_source_count")]
    pub source_count: usize,

    /// Delay between two polls of the same source (zero means 5s).
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Pipelines allowed in flight at once across all sources
    /// (zero means one per source).
    #[serde(default)]
    pub max_concurrent: usize,

    /// Base URL of the source server; `/snap.jpg` is appended.
    #[serde(default = "default_source_base_url")]
    pub source_base_url: String,

    /// Full URL payloads are posted to.
    #[serde(default = "default_sink_url")]
    pub sink_url: String,

    /// Timeout applied to each fetch and each send (zero means 5s).
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            source_count: DEFAULT_SOURCE_COUNT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_concurrent: 0,
            source_base_url: default_source_base_url(),
            sink_url: default_sink_url(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CollectorConfig {
    /// Create a configuration for `source_count` sources with default timing.
    pub fn new(source_count: usize) -> Self {
        Self {
            source_count,
            ..Self::default()
        }
    }

    /// Fill in unset values.
    ///
    /// `max_concurrent == 0` becomes `source_count`; a zero poll interval or
    /// request timeout becomes 5 seconds.
    #[must_use]
    pub fn with_defaults_applied(mut self) -> Self {
        if self.max_concurrent == 0 {
            self.max_concurrent = self.source_count;
        }
        if self.poll_interval.is_zero() {
            self.poll_interval = DEFAULT_POLL_INTERVAL;
        }
        if self.request_timeout.is_zero() {
            self.request_timeout = DEFAULT_REQUEST_TIMEOUT;
        }
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the concurrency bound.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Set the source base URL.
    pub fn with_source_base_url(mut self, url: impl Into<String>) -> Self {
        self.source_base_url = url.into();
        self
    }

    /// Set the sink URL.
    pub fn with_sink_url(mut self, url: impl Into<String>) -> Self {
        self.sink_url = url.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_config_defaults() {
        let config = CollectorConfig::default();
        assert_eq!(config.source_count, DEFAULT_SOURCE_COUNT);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.max_concurrent, 0);
        assert_eq!(config.source_base_url, "http://camera");
        assert_eq!(config.sink_url, "http://target:8080/image");
    }

    #[test]
    fn test_defaults_applied() {
        let config = CollectorConfig::new(4)
            .with_poll_interval(Duration::ZERO)
            .with_request_timeout(Duration::ZERO)
            .with_defaults_applied();

        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_values_survive_defaulting() {
        let config = CollectorConfig::new(4)
            .with_max_concurrent(2)
            .with_poll_interval(Duration::from_millis(250))
            .with_defaults_applied();

        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_deserialize_humantime_fields() {
        let yaml = r#"
source_count: 2
poll_interval: 250ms
request_timeout: 2s
sink_url: http://localhost:9000/image
"#;
        let config: CollectorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.source_count, 2);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.max_concurrent, 0);
        assert_eq!(config.source_base_url, DEFAULT_SOURCE_BASE_URL);
        assert_eq!(config.sink_url, "http://localhost:9000/image");
    }
}
