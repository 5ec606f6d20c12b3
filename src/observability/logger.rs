//! Line-oriented logger for the entrypoint
//!
//! - One log line = one event
//! - Synchronous, no buffering
//! - Note goes to stdout, Warn and Error go to stderr
//! - Fields are rendered in deterministic (sorted) key order

use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "ENTRYPOINT_LOG_FORMAT";

static FORMAT: OnceLock<LogFormat> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static CAPTURED: std::cell::RefCell<Option<Vec<u8>>> = const { std::cell::RefCell::new(None) };
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal progress
    Note = 0,
    /// Recoverable or suspicious configuration
    Warn = 1,
    /// Fatal, the process exits after logging
    Error = 2,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Note => "Note",
            Severity::Warn => "Warn",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output format of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `<timestamp> [<severity>] [Entrypoint]: <message>`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to text
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Entrypoint logger
pub struct Logger;

impl Logger {
    /// Fix the output format for the rest of the process.
    ///
    /// Only the first call has an effect.
    pub fn init(format: LogFormat) {
        let _ = FORMAT.set(format);
    }

    fn format() -> LogFormat {
        FORMAT.get().copied().unwrap_or_default()
    }

    /// Log a message with the given severity and fields
    pub fn log(severity: Severity, message: &str, fields: &[(&str, &str)]) {
        let format = Self::format();
        if Self::intercepted(severity, message, fields, format) {
            return;
        }
        if severity == Severity::Note {
            Self::log_to_writer(severity, message, fields, format, &mut io::stdout());
        } else {
            Self::log_to_writer(severity, message, fields, format, &mut io::stderr());
        }
    }

    #[cfg(not(test))]
    fn intercepted(
        _severity: Severity,
        _message: &str,
        _fields: &[(&str, &str)],
        _format: LogFormat,
    ) -> bool {
        false
    }

    /// Divert the line into the active [`capture_output`] buffer, if any
    #[cfg(test)]
    fn intercepted(
        severity: Severity,
        message: &str,
        fields: &[(&str, &str)],
        format: LogFormat,
    ) -> bool {
        CAPTURED.with(|cell| match cell.borrow_mut().as_mut() {
            Some(buffer) => {
                Self::log_to_writer(severity, message, fields, format, buffer);
                true
            }
            None => false,
        })
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        message: &str,
        fields: &[(&str, &str)],
        format: LogFormat,
        writer: &mut W,
    ) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let line = Self::render(&timestamp, severity, message, fields, format);

        // Write atomically (one syscall)
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    fn render(
        timestamp: &str,
        severity: Severity,
        message: &str,
        fields: &[(&str, &str)],
        format: LogFormat,
    ) -> String {
        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        match format {
            LogFormat::Text => {
                let mut output = format!(
                    "{} [{}] [Entrypoint]: {}",
                    timestamp,
                    severity.as_str(),
                    message
                );
                if !sorted_fields.is_empty() {
                    let rendered: Vec<String> = sorted_fields
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect();
                    output.push_str(" (");
                    output.push_str(&rendered.join(", "));
                    output.push(')');
                }
                output.push('\n');
                output
            }
            LogFormat::Json => {
                // serde_json's Map is ordered by key, so field order is stable
                let mut object = Map::new();
                object.insert("message".into(), Value::from(message));
                object.insert("severity".into(), Value::from(severity.as_str()));
                object.insert("timestamp".into(), Value::from(timestamp));
                for (key, value) in sorted_fields {
                    object.insert((*key).to_string(), Value::from(*value));
                }
                let mut output = Value::Object(object).to_string();
                output.push('\n');
                output
            }
        }
    }

    /// Log at Note level
    pub fn note(message: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Note, message, fields);
    }

    /// Log at Warn level
    pub fn warn(message: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, message, fields);
    }

    /// Log at Error level
    pub fn error(message: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, message, fields);
    }
}

/// Capture logs to a buffer for testing
#[cfg(test)]
pub fn capture_log(
    severity: Severity,
    message: &str,
    fields: &[(&str, &str)],
    format: LogFormat,
) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, message, fields, format, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

/// Run `f` and collect every line the current thread logs meanwhile
#[cfg(test)]
pub fn capture_output<R>(f: impl FnOnce() -> R) -> (R, String) {
    CAPTURED.with(|cell| *cell.borrow_mut() = Some(Vec::new()));
    let result = f();
    let buffer = CAPTURED
        .with(|cell| cell.borrow_mut().take())
        .unwrap_or_default();
    (result, String::from_utf8(buffer).unwrap())
}
