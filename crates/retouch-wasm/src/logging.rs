//! Forwards `tracing` events from retouch-core to the browser console.
//!
//! Spans are accepted but not displayed; only events are printed, one line
//! each, with their fields as `name=value`.

use std::fmt::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

/// Writes one formatted line for an event.
type Sink = fn(Level, &str);

pub(crate) struct ConsoleSubscriber {
    max_level: Level,
    next_span: AtomicU64,
    sink: Sink,
}

impl ConsoleSubscriber {
    pub(crate) fn new(max_level: Level) -> Self {
        Self::with_sink(max_level, emit)
    }

    fn with_sink(max_level: Level, sink: Sink) -> Self {
        Self {
            max_level,
            // Span ids must be non-zero.
            next_span: AtomicU64::new(1),
            sink,
        }
    }
}

impl Subscriber for ConsoleSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(LevelFilter::from_level(self.max_level))
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(self.next_span.fetch_add(1, Ordering::Relaxed))
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let metadata = event.metadata();
        let mut line = EventLine(format!("{} {}:", metadata.level(), metadata.target()));
        event.record(&mut line);
        (self.sink)(*metadata.level(), &line.0);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

struct EventLine(String);

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            let _ = write!(self.0, " {value}");
        } else {
            let _ = write!(self.0, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, " {value:?}");
        } else {
            let _ = write!(self.0, " {}={value:?}", field.name());
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use web_sys::console;

    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => console::error_1(&line),
        Level::WARN => console::warn_1(&line),
        Level::INFO => console::info_1(&line),
        _ => console::debug_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    if cfg!(debug_assertions) {
        eprintln!("{line}");
    }
}

/// Install the console subscriber as the global default. Debug builds show
/// debug events, release builds only warnings and errors.
pub(crate) fn install() {
    let max_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::WARN
    };
    if tracing::subscriber::set_global_default(ConsoleSubscriber::new(max_level)).is_err() {
        crate::console_log!("a tracing subscriber is already installed");
    }
}
