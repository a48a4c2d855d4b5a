use serde_json::json;
use serverless_json_log::capture_sink::CaptureSink;
use serverless_json_log::{Deadline, Emitter};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() {
    let sink = Arc::new(CaptureSink::new());
    let ctx = Deadline::after(Duration::from_secs(900));
    let logger = Emitter::builder()
        .context(&ctx)
        .default_field("service", "load-test")
        .sink(sink.clone())
        .build();

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.print(&json!({"loglevel": "info", "message": "default load test", "iteration": i}));
    }

    let elapsed = start.elapsed();
    println!("default config: rendered {} records ({} bytes) in {:?} (~{:.0} rec/s)",
        n,
        sink.contents().len(),
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
