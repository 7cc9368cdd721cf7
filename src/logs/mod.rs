//! Server log capture and inspection.
//!
//! Every session owns a [`ServerLogs`] inspector. Requests run under their server's
//! [`LogCapture`] dispatcher inside a per-request capture span, so each event the server
//! emits is appended to the session's ordered event list and checked against the session's
//! [`LogFilterChain`] and the request's own filters. Events that no filter accepts are
//! recorded as unexpected; it is up to the caller, usually
//! [`TestSession::end`](crate::TestSession::end), to fail the test.

mod event;
mod filter;
mod layer;

pub use event::LogEvent;
pub use filter::{LogFilter, LogFilterChain};
pub use layer::LogCapture;

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::sync::Notify;
use tracing::Level;

use crate::error::Error;

/// Thread-safe, cheaply clonable log inspector.
///
/// All state sits behind a single mutex so events from concurrent producers keep a single
/// insertion order.
#[derive(Clone)]
pub struct ServerLogs {
    inner: Arc<ServerLogsRef>,
}

struct ServerLogsRef {
    state: Mutex<LogState>,
    recorded: Notify,
}

struct LogState {
    events: Vec<LogEvent>,
    unexpected: Vec<LogEvent>,
    filters: LogFilterChain,
}

impl ServerLogs {
    pub fn new(filters: LogFilterChain) -> Self {
        Self {
            inner: Arc::new(ServerLogsRef {
                state: Mutex::new(LogState {
                    events: Vec::new(),
                    unexpected: Vec::new(),
                    filters,
                }),
                recorded: Notify::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        // A panicking test thread must not hide the logs from the remaining assertions.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event and classify it against the current filter chain.
    pub fn record(&self, event: LogEvent) {
        self.record_allowing(event, &[]);
    }

    /// Append an event, treating it as expected when any of `allowed` accepts it.
    pub(crate) fn record_allowing(&self, event: LogEvent, allowed: &[LogFilter]) {
        {
            let mut state = self.state();

            let expected = allowed.iter().any(|filter| filter.accepts(&event))
                || state.filters.is_expected(&event);
            if !expected {
                state.unexpected.push(event.clone());
            }

            state.events.push(event);
        }

        self.inner.recorded.notify_waiters();
    }

    /// Snapshot of every captured event in insertion order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.state().events.clone()
    }

    /// Snapshot of events no filter accepted at the time they were recorded.
    pub fn unexpected(&self) -> Vec<LogEvent> {
        self.state().unexpected.clone()
    }

    pub fn has_unexpected(&self) -> bool {
        !self.state().unexpected.is_empty()
    }

    /// First captured event matching `predicate`.
    pub fn find<F>(&self, predicate: F) -> Option<LogEvent>
    where
        F: Fn(&LogEvent) -> bool,
    {
        self.state().events.iter().find(|e| predicate(e)).cloned()
    }

    /// Number of captured events at exactly `level`.
    pub fn count_at(&self, level: Level) -> usize {
        self.state()
            .events
            .iter()
            .filter(|e| e.level == level)
            .count()
    }

    /// Forget every captured event, keeping the filter chain.
    pub fn clear(&self) {
        let mut state = self.state();
        state.events.clear();
        state.unexpected.clear();
    }

    /// Push a temporary filter override.
    pub fn push_filter(&self, filter: LogFilter) {
        tracing::debug!(filter = filter.name(), "Pushing log filter override");
        self.state().filters.push(filter);
    }

    /// Remove the most recently pushed override.
    pub fn pop_filter(&self) -> Option<LogFilter> {
        self.state().filters.pop()
    }

    /// Clear every override, leaving the global filters.
    pub fn reset_filters(&self) {
        self.state().filters.reset();
    }

    pub fn filter_depth(&self) -> usize {
        self.state().filters.depth()
    }

    /// Wait until an event matching `predicate` has been captured.
    ///
    /// Events captured before the call are considered too.
    ///
    /// # Returns
    /// - `Ok(LogEvent)` - First matching event
    /// - `Err(Error::LogTimeout)` - Nothing matched within `timeout`
    pub async fn wait_for<F>(&self, predicate: F, timeout: Duration) -> Result<LogEvent, Error>
    where
        F: Fn(&LogEvent) -> bool,
    {
        let wait = async {
            loop {
                // Register interest before checking so an event recorded in between wakes us.
                let notified = self.inner.recorded.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                if let Some(event) = self.find(&predicate) {
                    return event;
                }

                notified.await;
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| Error::LogTimeout(timeout))
    }

    /// Fail with [`Error::UnexpectedLogs`] when any unexpected event was captured.
    pub fn ensure_no_unexpected(&self) -> Result<(), Error> {
        let unexpected = self.unexpected();

        if unexpected.is_empty() {
            return Ok(());
        }

        let summary = unexpected
            .iter()
            .map(|event| format!("  {}", event))
            .collect::<Vec<_>>()
            .join("\n");

        Err(Error::UnexpectedLogs {
            count: unexpected.len(),
            summary,
        })
    }
}
