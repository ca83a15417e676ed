//! In-memory logger that records every message

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that keeps records in memory
///
/// Mostly useful in tests, to assert that a failure was reported.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Shorthand for `messages(LogLevel::Warn)`
    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warn)
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LoggerExt;

    #[test]
    fn test_memory_logger_records() {
        let logger = MemoryLogger::new();
        logger.info("started");
        logger.warn_fmt(format_args!("source {} failed", "docs"));
        crate::log_error!(logger, "code {}", 7);

        assert_eq!(logger.records().len(), 3);
        assert_eq!(logger.warnings(), vec!["source docs failed".to_string()]);
        assert_eq!(logger.messages(LogLevel::Error), vec!["code 7".to_string()]);

        logger.clear();
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_log_dispatches_by_level() {
        let logger = MemoryLogger::new();
        logger.log(LogLevel::Debug, "d");
        logger.log(LogLevel::Warn, "w");

        let records = logger.records();
        assert_eq!(records[0].level, LogLevel::Debug);
        assert_eq!(records[1].level, LogLevel::Warn);
    }
}
