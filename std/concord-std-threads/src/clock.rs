//!
//! Monotonic Clock Helpers
//!
//! Every timed wait in this crate takes an absolute deadline, never a
//! relative timeout. These helpers turn durations into deadlines and back.
//!

use std::time::{Duration, Instant};

/// Current point on the monotonic clock
pub fn now() -> Instant {
    Instant::now()
}

/// Absolute deadline `timeout` from now
pub fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout
}

/// Time left until `deadline`, zero once it has passed
pub fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

pub fn expired(deadline: Instant) -> bool {
    Instant::now() >= deadline
}
