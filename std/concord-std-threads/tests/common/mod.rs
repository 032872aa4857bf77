///
/// Shared helpers for the integration tests.
///

use std::sync::Once;
use std::thread;

static LOGGING: Once = Once::new();

/// Route tracing output through the test harness so it shows up on failure
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Spin (yielding) until `done` holds
#[allow(dead_code)]
pub fn settle<F: Fn() -> bool>(done: F) {
    while !done() {
        thread::yield_now();
    }
}
