//! Logging capability.
//!
//! The collection engine never talks to `tracing` directly. It records
//! diagnostics through the [`Logger`] trait so that the log stream, which is
//! the only place pipeline outcomes are visible, can be captured and asserted
//! on.
//!
//! - [`TracingLogger`]: production adapter forwarding to `tracing`
//! - [`MemoryLogger`]: keeps every entry in memory

mod memory;
mod tracing_adapter;

use std::fmt::Arguments;

pub use memory::{LogEntry, MemoryLogger};
pub use tracing_adapter::TracingLogger;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Get the level name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side-effecting sink for diagnostic text.
///
/// Implementations must be `Send + Sync`; one logger is shared by every
/// source loop and the error drain.
pub trait Logger: Send + Sync + 'static {
    /// Record a message at the given level.
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Info.to_string(), "INFO");
        assert_eq!(LogLevel::Error.as_str(), "ERROR");
    }

    #[test]
    fn test_macros_route_to_levels() {
        let logger = MemoryLogger::new();
        log_debug!(logger, "d {}", 1);
        log_info!(logger, "i {}", 2);
        log_warn!(logger, "w {}", 3);
        log_error!(logger, "e {}", 4);

        let levels: Vec<LogLevel> = logger.entries().iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error]
        );
        assert_eq!(logger.messages(), vec!["d 1", "i 2", "w 3", "e 4"]);
    }
}
