use crate::clock::{Clock, SystemClock};
use crate::config::EmitterConfig;
use crate::context::DeadlineContext;
use crate::error::EmitError;
use crate::record::{seconds, Fields, Resource};
use crate::sink::{LineSink, StdoutSink};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Message of the record emitted when a supplied context has no deadline.
pub const MISSING_DEADLINE_MESSAGE: &str = "Couldn't get Deadline from context";

/// Message of the record emitted in place of one that failed to serialize.
pub const FALLBACK_MESSAGE: &str = "Couldn't JSON marshal the error message";

/// Writes single-line JSON records for one invocation of a request
/// handler.
///
/// Each record holds the time, the default fields given at construction,
/// the fields passed to the print call, the elapsed time and the time left
/// before the deadline (only when a deadline is known), and the caller's
/// function, file and line as the last field.
///
/// Configuration is fixed at construction. An `Emitter` is `Send + Sync`
/// and can be shared across threads behind an `Arc`.
pub struct Emitter {
    start: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
    config: EmitterConfig,
    defaults: Fields,
    sink: Arc<dyn LineSink>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("start", &self.start)
            .field("deadline", &self.deadline)
            .field("config", &self.config)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Emitter {
    /// Create an emitter writing to stdout.
    ///
    /// **Parameters**
    /// - `context`: execution context of the invocation. `None` disables
    ///   the duration and time-left fields for the emitter's lifetime.
    ///   A context without a deadline is treated the same way, and one
    ///   critical record saying so is printed before returning.
    /// - `fields`: default fields added to every record. Recognized
    ///   `logger-*` keys are removed and applied as configuration, see
    ///   [`EmitterConfig::extract_reserved`].
    ///
    /// Construction never fails.
    pub fn create(context: Option<&dyn DeadlineContext>, mut fields: Fields) -> Self {
        let config = EmitterConfig::default().extract_reserved(&mut fields);
        let builder = Self::builder().config(config).defaults(fields);
        match context {
            Some(context) => builder.context(context).build(),
            None => builder.build(),
        }
    }

    /// Typed construction with configuration kept apart from default fields.
    pub fn builder<'a>() -> EmitterBuilder<'a> {
        EmitterBuilder::default()
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn defaults(&self) -> &Fields {
        &self.defaults
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Seconds since the emitter was created.
    pub fn elapsed(&self) -> f64 {
        seconds(self.clock.now() - self.start)
    }

    /// Seconds until the deadline, negative once it has passed. `None`
    /// without a deadline.
    pub fn time_left(&self) -> Option<f64> {
        let now = self.clock.now();
        self.deadline.map(|deadline| seconds(deadline - now))
    }

    /// Print `fields` as one JSON line.
    ///
    /// File and line in the resource field come from the call site. The
    /// function is reported as `<unknown>`; use
    /// [`emit_record!`](crate::emit_record) or [`print_at`](Self::print_at)
    /// with [`caller!`](crate::caller) to include it.
    #[track_caller]
    pub fn print<F: Serialize + ?Sized>(&self, fields: &F) {
        self.print_at(Resource::from_location(Location::caller()), fields);
    }

    /// Print `fields` as one JSON line with an explicit caller.
    ///
    /// `fields` must serialize to a JSON object (or `null` for no fields).
    /// If it can't be serialized, the fixed fallback record is printed
    /// instead and the original data is dropped. Nothing is returned and
    /// nothing panics; write failures are reported on stderr.
    pub fn print_at<F: Serialize + ?Sized>(&self, caller: Resource, fields: &F) {
        let now = self.clock.now();
        let line = match self.render_at(&caller, fields, now) {
            Ok(line) => line,
            Err(_) => {
                let fallback = self.level_fields(&self.config.labels.critical, FALLBACK_MESSAGE);
                match self.render_at(&caller, &fallback, now) {
                    Ok(line) => line,
                    Err(e) => {
                        eprintln!("fallback log record: {}", e);
                        return;
                    }
                }
            }
        };

        if let Err(e) = self.sink.write_line(&line) {
            eprintln!("{}", EmitError::from(e));
        }
    }

    /// Print a record at the configured warning label.
    #[track_caller]
    pub fn warning(&self, message: &str) {
        let fields = self.level_fields(&self.config.labels.warning, message);
        self.print_at(Resource::from_location(Location::caller()), &fields);
    }

    /// Print a record at the configured critical label.
    #[track_caller]
    pub fn critical(&self, message: &str) {
        let fields = self.level_fields(&self.config.labels.critical, message);
        self.print_at(Resource::from_location(Location::caller()), &fields);
    }

    /// Render the line [`print_at`](Self::print_at) would write at `now`,
    /// prefix, suffix and newline included, without the fallback.
    pub fn render_at<F: Serialize + ?Sized>(
        &self,
        caller: &Resource,
        fields: &F,
        now: DateTime<Utc>,
    ) -> Result<String, EmitError> {
        let payload = match serde_json::to_value(fields)? {
            Value::Object(map) => map,
            Value::Null => Fields::new(),
            other => return Err(EmitError::NotAnObject(kind(&other))),
        };
        let record = self.assemble(payload, caller, now);
        let json = serde_json::to_string(&record)?;
        Ok(format!("{}{}{}\n", self.config.prefix, json, self.config.suffix))
    }

    fn assemble(&self, payload: Fields, caller: &Resource, now: DateTime<Utc>) -> Fields {
        let names = &self.config.fields;
        let mut record = Fields::new();

        record.insert(names.time.clone(), self.config.time_format.render(now));
        // The resource key is always written last, so earlier values for it
        // are skipped rather than inserted and moved.
        let merged = self.defaults.iter().map(|(k, v)| (k.clone(), v.clone())).chain(payload);
        record.extend(merged.filter(|(k, _)| *k != names.resource));

        if let Some(deadline) = self.deadline {
            record.insert(names.duration.clone(), Value::from(seconds(now - self.start)));
            record.insert(names.time_left.clone(), Value::from(seconds(deadline - now)));
        }

        record.insert(names.resource.clone(), caller.to_value());
        record
    }

    fn level_fields(&self, label: &str, message: &str) -> Fields {
        let names = &self.config.fields;
        let mut fields = Fields::new();
        fields.insert(names.level.clone(), Value::from(label));
        fields.insert(names.message.clone(), Value::from(message));
        fields
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builder for [`Emitter`] with configuration separate from default fields.
///
/// ```
/// use serverless_json_log::{Deadline, Emitter, EmitterConfig};
/// use std::time::Duration;
///
/// let ctx = Deadline::after(Duration::from_secs(3));
/// let logger = Emitter::builder()
///     .context(&ctx)
///     .config(EmitterConfig::default().level_field("lvl"))
///     .build();
/// assert!(logger.time_left().is_some());
/// ```
#[derive(Default)]
pub struct EmitterBuilder<'a> {
    context: Option<&'a dyn DeadlineContext>,
    config: EmitterConfig,
    defaults: Fields,
    sink: Option<Arc<dyn LineSink>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<'a> EmitterBuilder<'a> {
    pub fn context(mut self, context: &'a dyn DeadlineContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn config(mut self, config: EmitterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn defaults(mut self, defaults: Fields) -> Self {
        self.defaults = defaults;
        self
    }

    /// Insert a single default field.
    pub fn default_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LineSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the emitter, reading the start time from its clock and the
    /// deadline from the context.
    ///
    /// When a context was given but has no deadline, one critical record
    /// with [`MISSING_DEADLINE_MESSAGE`] is printed before returning.
    pub fn build(self) -> Emitter {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let sink = self.sink.unwrap_or_else(|| Arc::new(StdoutSink));
        let deadline = self.context.and_then(|context| context.deadline());

        let emitter = Emitter {
            start: clock.now(),
            deadline,
            config: self.config,
            defaults: self.defaults,
            sink,
            clock,
        };

        if self.context.is_some() && deadline.is_none() {
            let fields = emitter.level_fields(&emitter.config.labels.critical, MISSING_DEADLINE_MESSAGE);
            emitter.print_at(crate::caller!(), &fields);
        }
        emitter
    }
}
