//! `tracing` adapter.

use std::fmt::Arguments;

use crate::log::{LogLevel, Logger};

/// Logger that forwards every entry to the `tracing` macros.
///
/// Requires a subscriber to be installed by the binary; without one the
/// entries are dropped silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "snapshot_relay::collector", "{}", args),
            LogLevel::Info => tracing::info!(target: "snapshot_relay::collector", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "snapshot_relay::collector", "{}", args),
            LogLevel::Error => tracing::error!(target: "snapshot_relay::collector", "{}", args),
        }
    }
}
