//! Custom logging module.
//!
//! This module provides a logger that formats log entries and forwards them to
//! a callback, so the presentation layer can show them in a log panel.

use crate::error::AppError;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Arc, Mutex};

type Callback = Box<dyn Fn(String) + Send + Sync>;

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {} {}", timestamp, level_str, record.args())
}

/// Shared slot for the callback receiving formatted lines. Lines logged while
/// no callback is set are dropped.
///
#[derive(Clone, Default)]
pub struct LogSink {
    callback: Arc<Mutex<Option<Callback>>>,
}

impl LogSink {
    pub fn set_callback(&self, callback: Callback) {
        if let Ok(mut guard) = self.callback.lock() {
            *guard = Some(callback);
        }
    }

    fn emit(&self, line: String) {
        if let Ok(callback) = self.callback.lock() {
            if let Some(ref cb) = *callback {
                cb(line);
            }
        }
    }
}

/// Logger that forwards records at or above its level to a [`LogSink`].
///
pub struct CallbackLogger {
    level: LevelFilter,
    sink: LogSink,
}

impl CallbackLogger {
    pub fn new(level: LevelFilter, sink: LogSink) -> Self {
        CallbackLogger { level, sink }
    }
}

impl Log for CallbackLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.sink.emit(format_log(record));
        }
    }

    fn flush(&self) {
        // No-op
    }
}

/// Install a [`CallbackLogger`] as the global logger and return its sink.
/// Fails if a global logger is already installed.
///
pub fn init(level: LevelFilter) -> Result<LogSink, AppError> {
    let sink = LogSink::default();
    log::set_boxed_logger(Box::new(CallbackLogger::new(level, sink.clone())))
        .map_err(|e| AppError::Logger(e.to_string()))?;
    log::set_max_level(level);
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(sink: &LogSink) -> Arc<Mutex<Vec<String>>> {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        sink.set_callback(Box::new(move |line| captured.lock().unwrap().push(line)));
        lines
    }

    #[test]
    fn format_log_includes_level_and_message() {
        let line = format_log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("Database busy"))
                .build(),
        );
        assert!(line.ends_with(" WARN Database busy"));
    }

    #[test]
    fn logger_filters_by_level() {
        let sink = LogSink::default();
        let logger = CallbackLogger::new(LevelFilter::Info, sink.clone());
        let lines = capture(&sink);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("Loaded 3 tasks."))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("hidden"))
                .build(),
        );

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("INFO Loaded 3 tasks."));
    }

    #[test]
    fn logger_without_callback_drops_lines() {
        let logger = CallbackLogger::new(LevelFilter::Trace, LogSink::default());
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .args(format_args!("nobody listening"))
                .build(),
        );
    }

    #[test]
    fn init_only_once() {
        assert!(init(LevelFilter::Debug).is_ok());
        assert!(matches!(init(LevelFilter::Debug), Err(AppError::Logger(_))));
    }
}
