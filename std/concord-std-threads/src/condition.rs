//!
//! Condition Facade
//!
//! A condition variable used with exactly one `Lock`. Waiting releases that
//! lock atomically and holds it again on return.
//!

use std::time::Instant;

use concord_std_core::{SyncError, SyncResult};
use parking_lot::Condvar;

use crate::lock::LockGuard;

#[derive(Debug, Default)]
pub struct Condition {
    inner: Condvar,
}

impl Condition {
    pub fn new() -> Self {
        Self { inner: Condvar::new() }
    }

    /// Release the lock behind `guard`, block, and re-acquire before returning.
    /// Wakeups may be spurious; callers recheck their predicate.
    pub fn wait<T>(&self, guard: &mut LockGuard<'_, T>) {
        self.inner.wait(guard);
    }

    pub fn wait_until<T>(&self, guard: &mut LockGuard<'_, T>, deadline: Instant) -> SyncResult<()> {
        if self.inner.wait_until(guard, deadline).timed_out() {
            Err(SyncError::TimedOut)
        } else {
            Ok(())
        }
    }

    /// Wake at most one waiter. Returns whether one was woken.
    pub fn signal(&self) -> bool {
        self.inner.notify_one()
    }

    /// Wake every waiter. Returns how many were woken.
    pub fn broadcast(&self) -> usize {
        self.inner.notify_all()
    }
}
