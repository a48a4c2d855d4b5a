//! Single-line JSON log records for serverless request handlers.
//!
//! An [`Emitter`] is created once per invocation from the platform's
//! execution context. Every print writes one line to stdout holding the
//! time, the emitter's default fields, the call's fields, the seconds
//! elapsed and left before the invocation deadline, and the caller's
//! location. The line below is what
//! [`emit_record!`] writes; [`Emitter::print`] fills the same resource
//! with the file and line but reports the function as `<unknown>`:
//!
//! ```text
//! {"time":"2024-03-01 12:00:00.250000","service":"x","loglevel":"info","message":"hello","duration":0.25,"timeLeft":2.75,"resource":{"function":"app::handle","file":"src/app.rs","row":12}}
//! ```
//!
//! Printing never fails from the caller's point of view. A record that
//! can't be serialized is replaced by a fixed critical-level record.

pub mod capture_sink;
pub mod clock;
pub mod config;
pub mod context;
pub mod emitter;
pub mod env;
pub mod error;
pub mod record;
pub mod sink;

#[cfg(feature = "tracing-layer")]
pub mod init;
#[cfg(feature = "tracing-layer")]
pub mod layer;

pub use config::{EmitterConfig, FieldNames, LevelLabels, TimeFormat};
pub use context::{Background, Deadline, DeadlineContext};
pub use emitter::{Emitter, EmitterBuilder};
pub use error::EmitError;
pub use record::{to_fields, Fields, Resource};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
