//! Configuration module for the relay.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Collector settings (source count, timing, endpoints)
//! - Mock source server settings (port, bind address)
//! - Mock sink server settings (port, bind address)

mod app;
mod validation;

pub use app::{AppConfig, DEFAULT_SERVER_BIND, DEFAULT_SERVER_PORT, ServerConfig};
pub use validation::{ConfigError, expand_env_vars, parse_duration};
