use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use tracing::{
    field::{Field, Visit},
    span, Dispatch, Event, Level, Span, Subscriber,
};
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

use crate::logs::{LogEvent, LogFilter, ServerLogs};

const CAPTURE_FIELD: &str = "bulletprove.capture";

/// Destination of the events emitted inside one capture span.
struct CaptureSink {
    logs: ServerLogs,
    allowed: Vec<LogFilter>,
}

/// Span extension marking a capture span and holding its sink.
#[derive(Clone)]
struct Capture(Arc<CaptureSink>);

type Pending = Arc<Mutex<HashMap<u64, Arc<CaptureSink>>>>;

/// Long-lived `tracing` dispatcher capturing server log events.
///
/// One instance is owned by each test server and reused for every request. Each request
/// runs inside a capture span created by [`span`](Self::span); events emitted anywhere
/// under that span, including tasks that carry it along, are recorded into the span's
/// [`ServerLogs`]. Events outside any capture span are ignored.
pub struct LogCapture {
    dispatch: Dispatch,
    pending: Pending,
    next_id: AtomicU64,
}

impl LogCapture {
    /// Build a dispatcher capturing events up to `max_level`.
    pub fn new(max_level: Level) -> Self {
        use tracing_subscriber::layer::SubscriberExt;

        let pending: Pending = Arc::default();
        let layer = LogCaptureLayer {
            max_level,
            pending: Arc::clone(&pending),
        };

        Self {
            dispatch: Dispatch::new(tracing_subscriber::registry().with(layer)),
            pending,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Create a capture span recording into `logs`.
    ///
    /// `allowed` filters apply only to events emitted under this span, on top of the
    /// filter chain of `logs`.
    pub fn span(&self, logs: &ServerLogs, allowed: Vec<LogFilter>) -> Span {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sink = Arc::new(CaptureSink {
            logs: logs.clone(),
            allowed,
        });

        self.pending().insert(id, sink);
        let span = tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::info_span!(target: "bulletprove", "request", bulletprove.capture = id)
        });
        self.pending().remove(&id);

        span
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Arc<CaptureSink>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `tracing` layer routing events to the [`ServerLogs`] of their enclosing capture span.
struct LogCaptureLayer {
    max_level: Level,
    pending: Pending,
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut visitor = CaptureIdVisitor::default();
        attrs.record(&mut visitor);

        let Some(capture_id) = visitor.id else {
            return;
        };

        let sink = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&capture_id)
            .cloned();

        if let (Some(sink), Some(span)) = (sink, ctx.span(id)) {
            span.extensions_mut().insert(Capture(sink));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > self.max_level {
            return;
        }

        let Some(scope) = ctx.event_scope(event) else {
            return;
        };

        let mut capture = None;
        let mut spans = Vec::new();
        for span in scope.from_root() {
            match span.extensions().get::<Capture>() {
                Some(found) => capture = Some(found.clone()),
                None => spans.push(span.name().to_string()),
            }
        }

        let Some(Capture(sink)) = capture else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut captured = LogEvent::new(*metadata.level(), metadata.target(), visitor.message);
        captured.fields = visitor.fields;
        captured.spans = spans;

        sink.logs.record_allowing(captured, &sink.allowed);
    }
}

#[derive(Default)]
struct CaptureIdVisitor {
    id: Option<u64>,
}

impl Visit for CaptureIdVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == CAPTURE_FIELD {
            self.id = Some(value);
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
