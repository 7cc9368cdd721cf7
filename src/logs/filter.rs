//! Named log filters and the filter chain deciding which events are expected.

use std::{fmt, sync::Arc};

use tracing::Level;

use crate::logs::LogEvent;

type Predicate = Arc<dyn Fn(&LogEvent) -> bool + Send + Sync>;

/// A named predicate accepting log events that are expected during a test.
#[derive(Clone)]
pub struct LogFilter {
    name: String,
    predicate: Predicate,
}

impl LogFilter {
    /// Create a filter from an arbitrary predicate.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&LogEvent) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Accept events strictly less severe than `level`.
    ///
    /// `below(Level::WARN)` accepts INFO, DEBUG and TRACE events.
    pub fn below(level: Level) -> Self {
        Self::new(format!("below {}", level), move |event| !event.is_at_least(level))
    }

    /// Accept every event whose target starts with `prefix`.
    pub fn target(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::new(format!("target {}", prefix), move |event| {
            event.target.starts_with(&prefix)
        })
    }

    /// Accept every event whose message contains `text`.
    pub fn message_contains(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(format!("message contains {:?}", text), move |event| {
            event.message.contains(&text)
        })
    }

    /// Accept events at exactly `level` whose message contains `text`.
    pub fn matching(level: Level, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(format!("{} containing {:?}", level, text), move |event| {
            event.level == level && event.message.contains(&text)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, event: &LogEvent) -> bool {
        (self.predicate)(event)
    }
}

impl fmt::Debug for LogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFilter").field("name", &self.name).finish()
    }
}

/// Global filters plus a stack of temporary overrides.
///
/// An event is expected when any filter in the chain accepts it. Overrides are pushed for
/// the duration of a request or test and removed again with [`pop`](Self::pop) or
/// [`reset`](Self::reset); the global filters are never removed.
#[derive(Debug, Clone, Default)]
pub struct LogFilterChain {
    global: Vec<LogFilter>,
    overrides: Vec<LogFilter>,
}

impl LogFilterChain {
    pub fn new(global: Vec<LogFilter>) -> Self {
        Self {
            global,
            overrides: Vec::new(),
        }
    }

    pub fn push(&mut self, filter: LogFilter) {
        self.overrides.push(filter);
    }

    /// Remove the most recently pushed override, if any.
    pub fn pop(&mut self) -> Option<LogFilter> {
        self.overrides.pop()
    }

    /// Drop every override, leaving only the global filters.
    pub fn reset(&mut self) {
        self.overrides.clear();
    }

    pub fn depth(&self) -> usize {
        self.overrides.len()
    }

    /// Name of the first filter accepting `event`, overrides checked first.
    pub fn accepted_by(&self, event: &LogEvent) -> Option<&str> {
        self.overrides
            .iter()
            .rev()
            .chain(self.global.iter())
            .find(|filter| filter.accepts(event))
            .map(LogFilter::name)
    }

    pub fn is_expected(&self, event: &LogEvent) -> bool {
        self.accepted_by(event).is_some()
    }
}
