use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use serverless_json_log::init::init_tracing;
use serverless_json_log::{Deadline, Emitter, EmitterConfig};

fn main() {
    let ctx = Deadline::after(Duration::from_secs(3));
    let logger = Emitter::builder()
        .context(&ctx)
        .config(EmitterConfig::from_env())
        .default_field("service", "auth")
        .build();

    if let Err(e) = init_tracing(Arc::new(logger)) {
        eprintln!("{}", e);
        return;
    }

    info!("starting handler");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );
}
