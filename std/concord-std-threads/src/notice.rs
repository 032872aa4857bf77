//!
//! Notice - Counted Wait/Signal Queue
//!
//! A notice pairs a `Condition` with two counters: `permits` (signals not yet
//! consumed) and `waiting` (threads currently blocked). A signal raised before
//! anyone waits is kept as a permit and honoured by the next waiter, so there
//! is no missed-wakeup window.
//!
//! The counters live inside the data of the owner's `Lock`, reached through
//! the `Tally` trait; the notice itself only owns its condition. Every
//! operation takes the owner's guard, so the lock is held by construction.
//!
//! Wake order among blocked threads is whatever the condition variable picks.
//! Nothing here promises first-blocked-first-woken.
//!

use std::time::Instant;

use concord_std_core::SyncResult;

use crate::condition::Condition;
use crate::lock::LockGuard;

/// Lock-protected half of a notice
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoticeCounts {
    permits: usize,
    waiting: usize,
}

impl NoticeCounts {
    pub const fn new() -> Self {
        Self { permits: 0, waiting: 0 }
    }

    /// Counters that start with `permits` signals already banked
    pub const fn with_permits(permits: usize) -> Self {
        Self { permits, waiting: 0 }
    }

    pub fn permits(&self) -> usize {
        self.permits
    }

    pub fn waiting(&self) -> usize {
        self.waiting
    }

    pub fn is_idle(&self) -> bool {
        self.permits == 0 && self.waiting == 0
    }
}

/// Lock-protected data that carries notice counters, addressed by slot
pub trait Tally {
    fn counts(&mut self, slot: usize) -> &mut NoticeCounts;

    fn peek(&self, slot: usize) -> &NoticeCounts;
}

impl Tally for NoticeCounts {
    fn counts(&mut self, _slot: usize) -> &mut NoticeCounts {
        self
    }

    fn peek(&self, _slot: usize) -> &NoticeCounts {
        self
    }
}

impl<const N: usize> Tally for [NoticeCounts; N] {
    fn counts(&mut self, slot: usize) -> &mut NoticeCounts {
        &mut self[slot]
    }

    fn peek(&self, slot: usize) -> &NoticeCounts {
        &self[slot]
    }
}

#[derive(Debug, Default)]
pub struct Notice {
    condition: Condition,
    slot: usize,
}

impl Notice {
    pub fn new() -> Self {
        Self::for_slot(0)
    }

    /// A notice whose counters sit at `slot` of the owner's tally
    pub fn for_slot(slot: usize) -> Self {
        Self { condition: Condition::new(), slot }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Consume a permit, blocking until one is available
    pub fn wait<T: Tally>(&self, guard: &mut LockGuard<'_, T>) {
        loop {
            let counts = guard.counts(self.slot);
            if counts.permits > 0 {
                counts.permits -= 1;
                return;
            }
            counts.waiting += 1;
            self.condition.wait(guard);
            guard.counts(self.slot).waiting -= 1;
        }
    }

    /// Like `wait`, but always blocks at least once before looking at the
    /// permits. A permit banked before the call does not let it through.
    pub fn do_wait<T: Tally>(&self, guard: &mut LockGuard<'_, T>) {
        loop {
            guard.counts(self.slot).waiting += 1;
            self.condition.wait(guard);
            let counts = guard.counts(self.slot);
            counts.waiting -= 1;
            if counts.permits > 0 {
                counts.permits -= 1;
                return;
            }
        }
    }

    /// `wait` bounded by an absolute deadline
    pub fn wait_until<T: Tally>(&self, guard: &mut LockGuard<'_, T>, deadline: Instant) -> SyncResult<()> {
        loop {
            let counts = guard.counts(self.slot);
            if counts.permits > 0 {
                counts.permits -= 1;
                return Ok(());
            }
            counts.waiting += 1;
            let woken = self.condition.wait_until(guard, deadline);
            let counts = guard.counts(self.slot);
            counts.waiting -= 1;
            if let Err(status) = woken {
                // a signal may have landed right at the deadline
                if counts.permits > 0 {
                    counts.permits -= 1;
                    return Ok(());
                }
                return Err(status);
            }
        }
    }

    /// Bank one permit and wake one blocked thread
    pub fn signal<T: Tally>(&self, guard: &mut LockGuard<'_, T>) {
        guard.counts(self.slot).permits += 1;
        self.condition.signal();
    }

    /// Bank a permit for every blocked thread and wake them all
    pub fn broadcast<T: Tally>(&self, guard: &mut LockGuard<'_, T>) {
        let counts = guard.counts(self.slot);
        counts.permits += counts.waiting;
        self.condition.broadcast();
    }

    /// Whether any thread is blocked on this notice
    pub fn ready<T: Tally>(&self, guard: &LockGuard<'_, T>) -> bool {
        guard.peek(self.slot).waiting != 0
    }

    /// Whether a permit is banked and not yet consumed
    pub fn pending<T: Tally>(&self, guard: &LockGuard<'_, T>) -> bool {
        guard.peek(self.slot).permits != 0
    }
}
