use crate::emitter::Emitter;
use crate::record::{Fields, Resource, UNKNOWN_FUNCTION};
use serde_json::Value;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// `tracing_subscriber` layer that prints every event it sees as one
/// record through an [`Emitter`].
///
/// The event's level goes into the level field (lowercase), its `message`
/// into the message field, and its other fields are added as they are.
/// The resource field names the event's module path, file and line.
///
/// The layer applies no filtering of its own; combine it with the usual
/// `tracing_subscriber` filters to choose which events are printed.
#[derive(Debug, Clone)]
pub struct EmitterLayer {
    emitter: Arc<Emitter>,
}

impl EmitterLayer {
    pub fn new(emitter: Arc<Emitter>) -> Self {
        Self { emitter }
    }

    pub fn emitter(&self) -> &Arc<Emitter> {
        &self.emitter
    }
}

impl<S> Layer<S> for EmitterLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let names = &self.emitter.config().fields;

        let mut fields = Fields::new();
        fields.insert(
            names.level.clone(),
            Value::String(meta.level().to_string().to_ascii_lowercase()),
        );

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message_key: &names.message,
        };
        event.record(&mut visitor);

        let caller = Resource::new(
            meta.module_path().unwrap_or(UNKNOWN_FUNCTION),
            meta.file().unwrap_or(meta.target()),
            meta.line().unwrap_or(0),
        );
        self.emitter.print_at(caller, &fields);
    }
}

/// Collects event fields into a JSON map, storing `message` under the
/// emitter's message key.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message_key: &'a str,
}

impl<'a> FieldVisitor<'a> {
    fn key(&self, field: &Field) -> String {
        if field.name() == "message" {
            self.message_key.to_string()
        } else {
            field.name().to_string()
        }
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        let key = self.key(field);
        self.fields.insert(key, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        let key = self.key(field);
        self.fields.insert(key, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        let key = self.key(field);
        self.fields.insert(key, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let key = self.key(field);
        self.fields.insert(key, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        let key = self.key(field);
        self.fields.insert(key, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let key = self.key(field);
        self.fields.insert(key, Value::String(format!("{:?}", value)));
    }
}
