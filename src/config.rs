use crate::env;
use crate::record::Fields;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt::Write as _;

/// Default strftime pattern for the time field: calendar date and time
/// with microsecond precision, e.g. `2024-03-01 12:00:00.250000`.
///
/// The fraction always has six digits; trailing zeros are not trimmed.
pub const DEFAULT_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Prefix shared by all configuration keys recognized by
/// [`EmitterConfig::extract_reserved`].
pub const RESERVED_PREFIX: &str = "logger-";

pub const TIME_FIELD_KEY: &str = "logger-time-field";
pub const LEVEL_FIELD_KEY: &str = "logger-level-field";
pub const MESSAGE_FIELD_KEY: &str = "logger-message-field";
pub const DURATION_FIELD_KEY: &str = "logger-duration-field";
pub const TIME_LEFT_FIELD_KEY: &str = "logger-time-left-field";
pub const RESOURCE_FIELD_KEY: &str = "logger-resource-field";
pub const WARNING_LABEL_KEY: &str = "logger-warning-label";
pub const CRITICAL_LABEL_KEY: &str = "logger-critical-label";
pub const TIME_FORMAT_KEY: &str = "logger-time-format";
pub const PREFIX_KEY: &str = "logger-prefix";
pub const SUFFIX_KEY: &str = "logger-suffix";

/// Prefix of the short key names accepted as aliases, e.g. `llogger-llfn`
/// for [`LEVEL_FIELD_KEY`]. Existing field bags written with these names
/// keep working.
pub const SHORT_PREFIX: &str = "llogger-";

/// JSON keys used for each role in an output record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub time: String,
    pub level: String,
    pub message: String,
    pub duration: String,
    pub time_left: String,
    pub resource: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            level: "loglevel".to_string(),
            message: "message".to_string(),
            duration: "duration".to_string(),
            time_left: "timeLeft".to_string(),
            resource: "resource".to_string(),
        }
    }
}

/// Labels written to the level field of internally generated records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLabels {
    pub warning: String,
    pub critical: String,
}

impl Default for LevelLabels {
    fn default() -> Self {
        Self {
            warning: "warning".to_string(),
            critical: "error".to_string(),
        }
    }
}

/// How the time field is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    /// Whole seconds since the Unix epoch, as an integer.
    Unix,
    /// Nanoseconds since the Unix epoch, as an integer.
    UnixNano,
    /// A chrono strftime pattern applied to the UTC time, as a string.
    Pattern(String),
}

impl Default for TimeFormat {
    fn default() -> Self {
        TimeFormat::Pattern(DEFAULT_TIME_PATTERN.to_string())
    }
}

impl TimeFormat {
    /// Parse `Unix`, `UnixNano` or a strftime pattern.
    ///
    /// Returns `None` for an empty string or a pattern chrono can't format.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Unix" => Some(TimeFormat::Unix),
            "UnixNano" => Some(TimeFormat::UnixNano),
            "" => None,
            pattern if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) => None,
            pattern => Some(TimeFormat::Pattern(pattern.to_string())),
        }
    }

    /// Render `now` as the value of the time field.
    pub fn render(&self, now: DateTime<Utc>) -> Value {
        match self {
            TimeFormat::Unix => Value::from(now.timestamp()),
            TimeFormat::UnixNano => now.timestamp_nanos_opt().map_or(Value::Null, Value::from),
            TimeFormat::Pattern(pattern) => {
                let mut out = String::new();
                if write!(out, "{}", now.format(pattern)).is_err() {
                    // Only reachable for a hand-built invalid Pattern.
                    out.clear();
                    let _ = write!(out, "{}", now.format(DEFAULT_TIME_PATTERN));
                }
                Value::String(out)
            }
        }
    }
}

/// Construction-time configuration of an [`Emitter`](crate::emitter::Emitter).
///
/// **Fields**
/// - `fields`: JSON keys for the time, level, message, duration,
///   time-left and resource roles.
/// - `labels`: level labels for internally generated warning and
///   critical records.
/// - `time_format`: rendering of the time field.
/// - `prefix` / `suffix`: literal text wrapped around every line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitterConfig {
    pub fields: FieldNames,
    pub labels: LevelLabels,
    pub time_format: TimeFormat,
    pub prefix: String,
    pub suffix: String,
}

#[derive(Debug, Clone, Copy)]
enum Setting {
    TimeField,
    LevelField,
    MessageField,
    DurationField,
    TimeLeftField,
    ResourceField,
    WarningLabel,
    CriticalLabel,
    TimeFormat,
    Prefix,
    Suffix,
}

impl Setting {
    const ALL: [Setting; 11] = [
        Setting::TimeField,
        Setting::LevelField,
        Setting::MessageField,
        Setting::DurationField,
        Setting::TimeLeftField,
        Setting::ResourceField,
        Setting::WarningLabel,
        Setting::CriticalLabel,
        Setting::TimeFormat,
        Setting::Prefix,
        Setting::Suffix,
    ];

    fn reserved_key(self) -> &'static str {
        match self {
            Setting::TimeField => TIME_FIELD_KEY,
            Setting::LevelField => LEVEL_FIELD_KEY,
            Setting::MessageField => MESSAGE_FIELD_KEY,
            Setting::DurationField => DURATION_FIELD_KEY,
            Setting::TimeLeftField => TIME_LEFT_FIELD_KEY,
            Setting::ResourceField => RESOURCE_FIELD_KEY,
            Setting::WarningLabel => WARNING_LABEL_KEY,
            Setting::CriticalLabel => CRITICAL_LABEL_KEY,
            Setting::TimeFormat => TIME_FORMAT_KEY,
            Setting::Prefix => PREFIX_KEY,
            Setting::Suffix => SUFFIX_KEY,
        }
    }

    fn short_key(self) -> &'static str {
        match self {
            Setting::TimeField => "llogger-tfn",
            Setting::LevelField => "llogger-llfn",
            Setting::MessageField => "llogger-mfn",
            Setting::DurationField => "llogger-dfn",
            Setting::TimeLeftField => "llogger-tlfn",
            Setting::ResourceField => "llogger-rfn",
            Setting::WarningLabel => "llogger-wm",
            Setting::CriticalLabel => "llogger-cm",
            Setting::TimeFormat => "llogger-tf",
            Setting::Prefix => "llogger-prefix",
            Setting::Suffix => "llogger-suffix",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            Setting::TimeField => env::LOG_EMITTER_TIME_FIELD_ENV,
            Setting::LevelField => env::LOG_EMITTER_LEVEL_FIELD_ENV,
            Setting::MessageField => env::LOG_EMITTER_MESSAGE_FIELD_ENV,
            Setting::DurationField => env::LOG_EMITTER_DURATION_FIELD_ENV,
            Setting::TimeLeftField => env::LOG_EMITTER_TIME_LEFT_FIELD_ENV,
            Setting::ResourceField => env::LOG_EMITTER_RESOURCE_FIELD_ENV,
            Setting::WarningLabel => env::LOG_EMITTER_WARNING_LABEL_ENV,
            Setting::CriticalLabel => env::LOG_EMITTER_CRITICAL_LABEL_ENV,
            Setting::TimeFormat => env::LOG_EMITTER_TIME_FORMAT_ENV,
            Setting::Prefix => env::LOG_EMITTER_PREFIX_ENV,
            Setting::Suffix => env::LOG_EMITTER_SUFFIX_ENV,
        }
    }
}

impl EmitterConfig {
    pub fn time_field(mut self, name: impl Into<String>) -> Self {
        self.fields.time = name.into();
        self
    }

    pub fn level_field(mut self, name: impl Into<String>) -> Self {
        self.fields.level = name.into();
        self
    }

    pub fn message_field(mut self, name: impl Into<String>) -> Self {
        self.fields.message = name.into();
        self
    }

    pub fn duration_field(mut self, name: impl Into<String>) -> Self {
        self.fields.duration = name.into();
        self
    }

    pub fn time_left_field(mut self, name: impl Into<String>) -> Self {
        self.fields.time_left = name.into();
        self
    }

    pub fn resource_field(mut self, name: impl Into<String>) -> Self {
        self.fields.resource = name.into();
        self
    }

    pub fn warning_label(mut self, label: impl Into<String>) -> Self {
        self.labels.warning = label.into();
        self
    }

    pub fn critical_label(mut self, label: impl Into<String>) -> Self {
        self.labels.critical = label.into();
        self
    }

    pub fn time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Move recognized `logger-*` keys, and their `llogger-*` short
    /// aliases, out of `fields` and apply them.
    ///
    /// Every recognized key is removed from `fields`, whether or not its
    /// value was usable. Values that are not strings, empty field names or
    /// labels, and unparseable time formats leave the current setting in
    /// place. Unrecognized keys stay in `fields`.
    pub fn extract_reserved(mut self, fields: &mut Fields) -> Self {
        for setting in Setting::ALL {
            // The long name is applied last so it wins when both are given.
            for key in [setting.short_key(), setting.reserved_key()] {
                let Some(value) = fields.remove(key) else {
                    continue;
                };
                let applied = match value.as_str() {
                    Some(text) => self.apply(setting, text),
                    None => false,
                };
                if !applied {
                    tracing::debug!(key, value = %value, "ignoring unusable logger configuration value");
                }
            }
        }
        self
    }

    /// Configuration built from defaults plus `LOG_EMITTER_*` variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply any `LOG_EMITTER_*` environment variables on top of `self`,
    /// with the same validation as [`extract_reserved`](Self::extract_reserved).
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(env::env_opt)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for setting in Setting::ALL {
            let var = setting.env_var();
            if let Some(value) = lookup(var) {
                if !self.apply(setting, &value) {
                    tracing::debug!(var, value = %value, "ignoring unusable logger configuration value");
                }
            }
        }
        self
    }

    fn apply(&mut self, setting: Setting, value: &str) -> bool {
        let slot = match setting {
            Setting::TimeFormat => {
                return match TimeFormat::parse(value) {
                    Some(format) => {
                        self.time_format = format;
                        true
                    }
                    None => false,
                };
            }
            Setting::Prefix => {
                self.prefix = value.to_string();
                return true;
            }
            Setting::Suffix => {
                self.suffix = value.to_string();
                return true;
            }
            Setting::TimeField => &mut self.fields.time,
            Setting::LevelField => &mut self.fields.level,
            Setting::MessageField => &mut self.fields.message,
            Setting::DurationField => &mut self.fields.duration,
            Setting::TimeLeftField => &mut self.fields.time_left,
            Setting::ResourceField => &mut self.fields.resource,
            Setting::WarningLabel => &mut self.labels.warning,
            Setting::CriticalLabel => &mut self.labels.critical,
        };
        if value.is_empty() {
            return false;
        }
        *slot = value.to_string();
        true
    }
}
