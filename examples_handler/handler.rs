use serde::Serialize;
use serde_json::json;
use serverless_json_log::{emit_record, to_fields, Deadline, DeadlineContext, Emitter};

#[derive(Serialize)]
struct Order {
    id: u64,
    total_cents: u64,
}

/// A request handler as a serverless runtime would call it, with the
/// invocation deadline passed in as epoch milliseconds.
fn handle(deadline_ms: i64, order: Order) {
    let ctx = Deadline::from_epoch_millis(deadline_ms);
    let logger = Emitter::create(
        ctx.as_ref().map(|ctx| ctx as &dyn DeadlineContext),
        to_fields(json!({
            "service": "orders",
            "version": "1.0.0",
            "logger-time-format": "Unix",
        })),
    );

    emit_record!(logger, { "loglevel": "info", "message": "order received", "order": order });

    if logger.time_left().is_some_and(|left| left < 1.0) {
        logger.warning("less than a second of execution time left");
    }

    emit_record!(logger, { "loglevel": "info", "message": "order stored" });
}

fn main() {
    let deadline_ms = chrono::Utc::now().timestamp_millis() + 3_000;
    handle(deadline_ms, Order { id: 7, total_cents: 1_250 });
}
