/// Reasons a record could not be rendered or written.
///
/// These never escape [`Emitter::print`](crate::emitter::Emitter::print);
/// they are returned by the lower-level rendering API and reported on
/// stderr otherwise.
#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("log fields must serialize to a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("failed to write log line: {0}")]
    Write(#[from] std::io::Error),
}
