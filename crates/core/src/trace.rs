//! Tracing providers that need no configuration.
//!
//! [`EmergencyLogger`] is usable before anything else is initialized and is
//! what breaks the cycle between resolving the tracing service and reporting
//! problems met while resolving it.

use crate::services::TraceProvider;
use std::io::Write;
use tracing::Level;

macro_rules! level_event {
    ($target:expr, $level:expr, $message:expr) => {
        match $level {
            Level::ERROR => tracing::error!(target: $target, "{}", $message),
            Level::WARN => tracing::warn!(target: $target, "{}", $message),
            Level::INFO => tracing::info!(target: $target, "{}", $message),
            Level::DEBUG => tracing::debug!(target: $target, "{}", $message),
            _ => tracing::trace!(target: $target, "{}", $message),
        }
    };
}

/// Stateless logger for use while the service layer is not available.
///
/// Emits `tracing` events under `wireup::emergency`. Until a global
/// subscriber has been installed, warnings and errors are also written to
/// standard error so they are never lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmergencyLogger;

impl EmergencyLogger {
    pub fn log(level: Level, message: &str) {
        level_event!("wireup::emergency", level, message);

        if level <= Level::WARN && !tracing::dispatcher::has_been_set() {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "[wireup] {} {}", level, message);
        }
    }

    pub fn debug(message: &str) {
        Self::log(Level::DEBUG, message);
    }

    pub fn info(message: &str) {
        Self::log(Level::INFO, message);
    }

    pub fn warn(message: &str) {
        Self::log(Level::WARN, message);
    }

    pub fn error(message: &str) {
        Self::log(Level::ERROR, message);
    }
}

/// Fallback tracing provider backed by the [`EmergencyLogger`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmergencyTraceProvider;

impl TraceProvider for EmergencyTraceProvider {
    fn name(&self) -> &str {
        "emergency"
    }

    fn trace(&self, level: Level, message: &str) {
        EmergencyLogger::log(level, message);
    }
}

/// Built-in tracing provider forwarding to `tracing` under `wireup::trace`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTraceProvider;

impl TraceProvider for TracingTraceProvider {
    fn name(&self) -> &str {
        "tracing"
    }

    fn is_enabled(&self, level: Level) -> bool {
        match level {
            Level::ERROR => tracing::enabled!(target: "wireup::trace", Level::ERROR),
            Level::WARN => tracing::enabled!(target: "wireup::trace", Level::WARN),
            Level::INFO => tracing::enabled!(target: "wireup::trace", Level::INFO),
            Level::DEBUG => tracing::enabled!(target: "wireup::trace", Level::DEBUG),
            _ => tracing::enabled!(target: "wireup::trace", Level::TRACE),
        }
    }

    fn trace(&self, level: Level, message: &str) {
        level_event!("wireup::trace", level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_provider_never_fails() {
        let provider = EmergencyTraceProvider;
        assert_eq!(provider.name(), "emergency");
        assert!(provider.is_enabled(Level::TRACE));
        provider.trace(Level::DEBUG, "debug line");
        EmergencyLogger::info("info line");
    }

    #[test]
    fn test_tracing_provider_name() {
        let provider = TracingTraceProvider;
        assert_eq!(provider.name(), "tracing");
        provider.trace(Level::INFO, "forwarded");
    }
}
