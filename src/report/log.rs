//! Event logging for the bootstrapper.

use std::fmt;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Sink for bootstrapper log lines.
pub trait EventLog {
    /// Record a message at the given severity.
    fn log(&mut self, message: &str, level: LogLevel);
}

/// [`EventLog`] that forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn log(&mut self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
    }
}

/// Dump invocation parameters at debug level, one line per parameter.
pub fn log_params(log: &mut dyn EventLog, operation: &str, params: &[(&str, String)]) {
    log.log(&format!("{} called with {} parameter(s)", operation, params.len()), LogLevel::Debug);
    for (name, value) in params {
        log.log(&format!("  {} = {}", name, value), LogLevel::Debug);
    }
}

/// In-memory [`EventLog`], handy for tests and for replaying a run.
#[derive(Debug, Default, Clone)]
pub struct MemoryLog {
    entries: Vec<(LogLevel, String)>,
}

impl MemoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries.
    pub fn entries(&self) -> &[(LogLevel, String)] {
        &self.entries
    }

    /// Messages recorded at exactly `level`.
    pub fn at(&self, level: LogLevel) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }
}

impl EventLog for MemoryLog {
    fn log(&mut self, message: &str, level: LogLevel) {
        self.entries.push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_filters_by_level() {
        let mut log = MemoryLog::new();
        log.log("starting", LogLevel::Info);
        log.log("broken", LogLevel::Error);
        log.log("done", LogLevel::Info);

        assert_eq!(log.at(LogLevel::Info), vec!["starting", "done"]);
        assert_eq!(log.at(LogLevel::Error), vec!["broken"]);
        assert_eq!(log.entries().len(), 3);
    }

    #[test]
    fn log_params_writes_each_parameter() {
        let mut log = MemoryLog::new();
        log_params(
            &mut log,
            "bootstrap",
            &[("manifest_path", "modules.psd1".to_string())],
        );

        let debug = log.at(LogLevel::Debug);
        assert_eq!(debug.len(), 2);
        assert!(debug[0].contains("bootstrap"));
        assert_eq!(debug[1], "  manifest_path = modules.psd1");
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
    }

    #[test]
    fn tracing_log_accepts_all_levels() {
        let mut log = TracingLog;
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Error] {
            log.log("message", level);
        }
    }
}
