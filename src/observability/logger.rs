//! Structured JSON logger
//!
//! One log line per event, written synchronously with no buffering.
//! Lines are JSON objects with deterministic (sorted) key order, so log
//! output is stable across runs. Errors go to stderr, everything else
//! to stdout. Logging never fails an operation: write errors on the
//! log stream are ignored.

use std::fmt;
use std::io::{self, Write};

use serde_json::Value;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info,
    /// Recoverable issues
    Warn,
    /// Operation failures
    Error,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous structured logger.
pub struct Logger;

impl Logger {
    /// Emits one event line. `Error` severity goes to stderr, the rest
    /// to stdout.
    pub fn emit(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = Self::render(severity, event, fields);
        if severity >= Severity::Error {
            Self::write_line(&mut io::stderr(), &line);
        } else {
            Self::write_line(&mut io::stdout(), &line);
        }
    }

    /// Renders an event as a single JSON line with sorted keys.
    fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        // serde_json::Map is BTreeMap-backed here, so keys serialize
        // sorted without extra work.
        let mut map = serde_json::Map::new();
        map.insert("event".to_string(), Value::String(event.to_string()));
        map.insert(
            "severity".to_string(),
            Value::String(severity.as_str().to_string()),
        );
        for (key, value) in fields {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        Value::Object(map).to_string()
    }

    fn write_line<W: Write>(writer: &mut W, line: &str) {
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.write_all(b"\n");
        let _ = writer.flush();
    }
}
