/// Environment variable names read by
/// [`EmitterConfig::with_env_overrides`](crate::config::EmitterConfig::with_env_overrides).
///
/// These are purely helpers; an emitter never reads the environment
/// unless asked to.

/// Override for the time field name.
pub const LOG_EMITTER_TIME_FIELD_ENV: &str = "LOG_EMITTER_TIME_FIELD";

/// Override for the log-level field name.
pub const LOG_EMITTER_LEVEL_FIELD_ENV: &str = "LOG_EMITTER_LEVEL_FIELD";

/// Override for the message field name.
pub const LOG_EMITTER_MESSAGE_FIELD_ENV: &str = "LOG_EMITTER_MESSAGE_FIELD";

/// Override for the duration field name.
pub const LOG_EMITTER_DURATION_FIELD_ENV: &str = "LOG_EMITTER_DURATION_FIELD";

/// Override for the time-left field name.
pub const LOG_EMITTER_TIME_LEFT_FIELD_ENV: &str = "LOG_EMITTER_TIME_LEFT_FIELD";

/// Override for the resource field name.
pub const LOG_EMITTER_RESOURCE_FIELD_ENV: &str = "LOG_EMITTER_RESOURCE_FIELD";

/// Label used for internally generated warning-tier records.
pub const LOG_EMITTER_WARNING_LABEL_ENV: &str = "LOG_EMITTER_WARNING_LABEL";

/// Label used for internally generated critical-tier records.
pub const LOG_EMITTER_CRITICAL_LABEL_ENV: &str = "LOG_EMITTER_CRITICAL_LABEL";

/// `Unix`, `UnixNano` or a strftime pattern.
pub const LOG_EMITTER_TIME_FORMAT_ENV: &str = "LOG_EMITTER_TIME_FORMAT";

/// Literal text written before every line.
pub const LOG_EMITTER_PREFIX_ENV: &str = "LOG_EMITTER_PREFIX";

/// Literal text written after every line, before the newline.
pub const LOG_EMITTER_SUFFIX_ENV: &str = "LOG_EMITTER_SUFFIX";

/// Read an environment variable, treating unset and non-unicode values
/// as absent.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
