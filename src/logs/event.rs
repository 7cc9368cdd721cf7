use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use tracing::Level;

/// A single log event captured from the server under test.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Structured fields recorded alongside the message, rendered with `Debug`.
    pub fields: BTreeMap<String, String>,
    /// Names of the spans enclosing the event, outermost first.
    pub spans: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Create an event with no fields or spans, stamped with the current time.
    pub fn new(level: Level, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            spans: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach a structured field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Whether this event is at `level` or more severe.
    pub fn is_at_least(&self, level: Level) -> bool {
        // tracing orders levels by verbosity, ERROR being the smallest
        self.level <= level
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>5} {}: {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )?;

        for (name, value) in &self.fields {
            write!(f, " {}={}", name, value)?;
        }

        Ok(())
    }
}
