//! Clock helpers

use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds, used to stamp inbound commands
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

static SERVER_START: OnceLock<Instant> = OnceLock::new();

/// Record the server start time. Later calls are no-ops.
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}
