use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{json, Value};
use serverless_json_log::capture_sink::CaptureSink;
use serverless_json_log::emitter::FALLBACK_MESSAGE;
use serverless_json_log::{
    emit_record, to_fields, Background, Deadline, DeadlineContext, Emitter, EmitterConfig, Fields,
};
use std::sync::Arc;
use std::time::Duration;

/// Build an emitter the way `Emitter::create` does, but capturing lines.
fn create(context: Option<&dyn DeadlineContext>, fields: Value) -> (Emitter, Arc<CaptureSink>) {
    let mut fields = to_fields(fields);
    let config = EmitterConfig::default().extract_reserved(&mut fields);
    let sink = Arc::new(CaptureSink::new());
    let mut builder = Emitter::builder().config(config).defaults(fields).sink(sink.clone());
    if let Some(context) = context {
        builder = builder.context(context);
    }
    (builder.build(), sink)
}

fn parse(line: &str) -> Fields {
    to_fields(serde_json::from_str(line).expect("every line is valid JSON"))
}

fn keys(record: &Fields) -> Vec<&str> {
    record.keys().map(String::as_str).collect()
}

#[test]
fn no_context_omits_timing_fields() {
    let (logger, sink) = create(None, json!({"service": "x"}));
    logger.print(&json!({"loglevel": "info", "message": "hello"}));

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let record = parse(&lines[0]);
    assert_eq!(keys(&record), ["time", "service", "loglevel", "message", "resource"]);
    assert_eq!(record["service"], json!("x"));
    assert_eq!(record["loglevel"], json!("info"));
    assert_eq!(record["message"], json!("hello"));
}

#[test]
fn time_left_starts_near_deadline_and_decreases() {
    let ctx = Deadline::after(Duration::from_secs(3));
    let (logger, sink) = create(Some(&ctx), json!({}));

    logger.print(&json!({"message": "first"}));
    std::thread::sleep(Duration::from_millis(20));
    logger.print(&json!({"message": "second"}));

    let lines = sink.lines();
    let first = parse(&lines[0]);
    let second = parse(&lines[1]);
    let left = first["timeLeft"].as_f64().unwrap();
    assert!((2.9..=3.0).contains(&left), "timeLeft was {}", left);
    assert!(second["timeLeft"].as_f64().unwrap() < left);
    assert!(second["duration"].as_f64().unwrap() > first["duration"].as_f64().unwrap());
}

#[test]
fn passed_deadline_gives_negative_time_left() {
    let ctx = Deadline::at(chrono::Utc::now() - chrono::Duration::seconds(1));
    let (logger, sink) = create(Some(&ctx), json!({}));
    logger.print(&json!({}));

    let record = parse(&sink.lines()[0]);
    assert!(record["timeLeft"].as_f64().unwrap() < -0.9);
}

#[test]
fn call_fields_override_defaults() {
    let (logger, sink) = create(None, json!({"service": "x", "env": "prod", "version": "1.0.0"}));
    logger.print(&json!({"env": "staging", "extra": [1, 2]}));

    let record = parse(&sink.lines()[0]);
    assert_eq!(record["env"], json!("staging"));
    assert_eq!(record["service"], json!("x"));
    assert_eq!(record["version"], json!("1.0.0"));
    assert_eq!(record["extra"], json!([1, 2]));
}

#[test]
fn level_field_override_renames_key() {
    let (logger, sink) = create(None, json!({"logger-level-field": "lvl"}));
    logger.print(&json!({"lvl": "warn", "message": "m"}));

    let record = parse(&sink.lines()[0]);
    assert_eq!(record["lvl"], json!("warn"));
    assert!(!record.contains_key("loglevel"));
    assert!(!record.contains_key("logger-level-field"));
}

#[test]
fn custom_names_prefix_suffix_and_unix_nano() {
    let (logger, sink) = create(
        Some(&Deadline::after(Duration::from_secs(3))),
        json!({
            "service": "orders-test",
            "logger-time-field": "custom-time",
            "logger-time-format": "UnixNano",
            "logger-message-field": "custom-message",
            "logger-duration-field": "custom-duration",
            "logger-time-left-field": "custom-timeLeft",
            "logger-resource-field": "custom-resource",
            "logger-prefix": "prefix: ",
            "logger-suffix": " suffix",
        }),
    );
    logger.print(&json!({"custom-message": "Testmessage2"}));

    let line = &sink.lines()[0];
    let json = line
        .strip_prefix("prefix: ")
        .and_then(|rest| rest.strip_suffix(" suffix"))
        .expect("line wrapped in prefix and suffix");
    let record = parse(json);
    assert_eq!(
        keys(&record),
        [
            "custom-time",
            "service",
            "custom-message",
            "custom-duration",
            "custom-timeLeft",
            "custom-resource"
        ]
    );
    let nanos = record["custom-time"].as_i64().unwrap();
    assert!(nanos <= chrono::Utc::now().timestamp_nanos_opt().unwrap());
}

#[test]
fn default_time_format_has_microseconds() {
    let start = chrono::Utc::now().naive_utc();
    let (logger, sink) = create(None, json!({}));
    logger.print(&json!({}));

    let record = parse(&sink.lines()[0]);
    let time = record["time"].as_str().unwrap();
    let parsed = chrono::NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S%.6f").unwrap();
    assert!(parsed >= start - chrono::Duration::microseconds(1));
}

#[test]
fn wrong_typed_configuration_keeps_defaults() {
    let (logger, sink) = create(
        None,
        json!({"logger-time-field": 1, "logger-level-field": 2, "logger-critical-label": 8}),
    );
    logger.critical("boom");

    let record = parse(&sink.lines()[0]);
    assert_eq!(keys(&record), ["time", "loglevel", "message", "resource"]);
    assert_eq!(record["loglevel"], json!("error"));
}

#[test]
fn context_without_deadline_prints_one_critical_record() {
    let (logger, sink) = create(Some(&Background), json!({}));
    logger.print(&json!({"message": "Testmessage"}));

    let lines = sink.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(parse(&lines[0])["message"], json!("Couldn't get Deadline from context"));
    assert_eq!(parse(&lines[0])["loglevel"], json!("error"));
    assert!(!parse(&lines[1]).contains_key("timeLeft"));
}

struct Callback;

impl Serialize for Callback {
    fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("a function value can't be encoded"))
    }
}

#[derive(Serialize)]
struct Payload {
    message: &'static str,
    callback: Callback,
}

#[test]
fn unserializable_field_yields_single_fallback_line() {
    let (logger, sink) = create(None, json!({"service": "x"}));
    logger.print(&Payload {
        message: "did-we-fail?",
        callback: Callback,
    });

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let record = parse(&lines[0]);
    assert_eq!(record["loglevel"], json!("error"));
    assert_eq!(record["message"], json!(FALLBACK_MESSAGE));
    assert!(!lines[0].contains("did-we-fail?"));
}

#[test]
fn identical_inputs_differ_only_in_time_fields() {
    let ctx = Deadline::after(Duration::from_secs(3));
    let (first, first_sink) = create(Some(&ctx), json!({"service": "x"}));
    let (second, second_sink) = create(Some(&ctx), json!({"service": "x"}));
    let caller = serverless_json_log::Resource::new("handler", "src/handler.rs", 3);
    first.print_at(caller.clone(), &json!({"message": "m"}));
    second.print_at(caller, &json!({"message": "m"}));

    let mut a = parse(&first_sink.lines()[0]);
    let mut b = parse(&second_sink.lines()[0]);
    for key in ["time", "duration", "timeLeft"] {
        assert!(a.remove(key).is_some());
        assert!(b.remove(key).is_some());
    }
    assert_eq!(a, b);
}

#[test]
fn emit_record_names_the_calling_function() {
    let (logger, sink) = create(None, json!({}));
    let row = line!() + 1;
    emit_record!(logger, { "message": "from macro" });
    emit_record!(logger, to_fields(json!({"message": "from map"})));

    let lines = sink.lines();
    let record = parse(&lines[0]);
    assert_eq!(record["message"], json!("from macro"));
    assert_eq!(
        record["resource"],
        json!({
            "function": "emitter::emit_record_names_the_calling_function",
            "file": file!(),
            "row": row,
        })
    );
    assert_eq!(parse(&lines[1])["message"], json!("from map"));
}

#[test]
fn concurrent_prints_produce_whole_lines() {
    let (logger, sink) = create(None, json!({"service": "x"}));
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..50 {
                    logger.print(&json!({"worker": worker, "i": i}));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), 400);
    for line in &lines {
        assert_eq!(parse(line)["service"], json!("x"));
    }
}

#[test]
fn create_writes_to_stdout_without_panicking() {
    let logger = Emitter::create(None, to_fields(json!({"service": "x"})));
    logger.print(&json!({"message": "to stdout"}));
    assert!(logger.defaults().contains_key("service"));
}

#[test]
fn short_alias_keys_configure_instead_of_leaking() {
    let (logger, sink) = create(
        None,
        json!({"service": "x", "llogger-llfn": "lvl", "llogger-tf": "Unix"}),
    );
    logger.print(&json!({"lvl": "warn"}));

    let record = parse(&sink.lines()[0]);
    assert_eq!(keys(&record), ["time", "service", "lvl", "resource"]);
    assert!(record["time"].is_i64());
    assert_eq!(record["lvl"], json!("warn"));
}
