//! Structured logging boundary contract.

use foodify_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Additional event fields.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// Build a field map from key/value pairs.
pub fn log_fields<K, V, I>(pairs: I) -> LogFields
where
    K: Into<Box<str>>,
    V: Into<serde_json::Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Stable event name (e.g. `feed.fetch.start`).
    pub event: Box<str>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional structured fields.
    pub fields: Option<LogFields>,
    /// Optional error payload.
    pub error: Option<serde_json::Value>,
}

impl LogEvent {
    /// Build an event without an error payload.
    #[must_use]
    pub fn new(level: LogLevel, event: &str, message: &str, fields: Option<LogFields>) -> Self {
        Self {
            event: event.into(),
            level,
            message: message.into(),
            fields,
            error: None,
        }
    }

    /// Attach a serialized error envelope.
    #[must_use]
    pub fn with_error(mut self, error: &ErrorEnvelope) -> Self {
        self.error = serde_json::to_value(error).ok();
        self
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit a structured event.
    fn log(&self, event: LogEvent);

    /// Create a child logger with base fields applied to every event.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;

    /// Convenience: debug event.
    fn debug(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Debug, event, message, fields));
    }

    /// Convenience: info event.
    fn info(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Info, event, message, fields));
    }

    /// Convenience: warn event.
    fn warn(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Warn, event, message, fields));
    }

    /// Convenience: error event.
    fn error(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Error, event, message, fields));
    }

    /// Convenience: event carrying an error envelope.
    fn failure(
        &self,
        level: LogLevel,
        event: &str,
        message: &str,
        fields: Option<LogFields>,
        error: &ErrorEnvelope,
    ) {
        self.log(LogEvent::new(level, event, message, fields).with_error(error));
    }
}
