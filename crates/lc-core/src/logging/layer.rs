//! Tracing layer that writes one JSON object per event.
//!
//! Output goes to stderr by default so stdout stays free for payloads.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::Level;

/// Event fields as JSON, with the `message` field held apart.
#[derive(Default)]
struct FieldMap {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldMap {
    fn put(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(text)) => self.message = Some(text),
            (name, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldMap {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    // Non-finite floats have no JSON form and are dropped.
    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.put(field, Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }
}

/// Writes each tracing event as one JSON line.
///
/// Keys: `ts`, `level`, `event` (the tracing target, one of
/// [`event_names`](super::event_names)), `message`, then `spans` (innermost
/// first) and `fields` when present.
pub struct JsonlLayer<W = io::Stderr> {
    sink: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(sink: W) -> Self {
        JsonlLayer {
            sink: Mutex::new(sink),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut map = FieldMap::default();
        event.record(&mut map);

        let meta = event.metadata();
        let mut line = json!({
            "ts": Utc::now().to_rfc3339(),
            "level": Level::from(*meta.level()),
            "event": meta.target(),
            "message": map.message.unwrap_or_default(),
        });

        let spans: Vec<&str> = ctx
            .event_scope(event)
            .map(|scope| scope.map(|span| span.name()).collect())
            .unwrap_or_default();
        if !spans.is_empty() {
            line["spans"] = json!(spans);
        }
        if !map.fields.is_empty() {
            line["fields"] = Value::Object(map.fields);
        }

        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{}", line);
        }
    }
}
