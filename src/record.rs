use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::panic::Location;

/// Open-ended key/value payload merged into an output record.
///
/// Backed by `serde_json::Map` with insertion order preserved, so the
/// field order of an emitted line follows the order fields were added.
pub type Fields = serde_json::Map<String, Value>;

/// Function name reported when the caller could only be resolved to a
/// source location.
pub const UNKNOWN_FUNCTION: &str = "<unknown>";

/// Call-site metadata appended as the last field of every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub function: String,
    pub file: String,
    pub row: u32,
}

impl Resource {
    pub fn new(function: impl Into<String>, file: impl Into<String>, row: u32) -> Self {
        Resource {
            function: function.into(),
            file: file.into(),
            row,
        }
    }

    /// Build a resource from a `#[track_caller]` location. Rust exposes no
    /// runtime lookup for the enclosing function, so it is reported as
    /// [`UNKNOWN_FUNCTION`]; use [`caller!`](crate::caller) to get it.
    pub fn from_location(location: &Location<'_>) -> Self {
        Resource::new(UNKNOWN_FUNCTION, location.file(), location.line())
    }

    pub(crate) fn to_value(&self) -> Value {
        json!({
            "function": self.function,
            "file": self.file,
            "row": self.row,
        })
    }
}

/// Convert a `serde_json::Value` into [`Fields`].
///
/// Anything other than an object yields an empty map.
pub fn to_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Signed number of seconds in `delta`, with nanosecond precision when it
/// fits in an `i64`.
pub(crate) fn seconds(delta: chrono::Duration) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

/// Resolve the enclosing function path, file and line at the call site.
///
/// Expands to a [`Resource`]. Inside closures and `async` blocks the
/// function is the one that contains them.
#[macro_export]
macro_rules! caller {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        let mut name = name.strip_suffix("::__here").unwrap_or(name);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        $crate::record::Resource::new(name, file!(), line!())
    }};
}

/// Print a record through an [`Emitter`](crate::emitter::Emitter), filling
/// the resource field from the call site.
///
/// ```
/// use serverless_json_log::{emit_record, Emitter, Fields};
///
/// let logger = Emitter::create(None, Fields::new());
/// emit_record!(logger, { "loglevel": "info", "message": "hello" });
/// ```
#[macro_export]
macro_rules! emit_record {
    ($emitter:expr, { $($json:tt)* }) => {
        $emitter.print_at(
            $crate::caller!(),
            &$crate::__private::serde_json::json!({ $($json)* }),
        )
    };
    ($emitter:expr, $fields:expr $(,)?) => {
        $emitter.print_at($crate::caller!(), &$fields)
    };
}
