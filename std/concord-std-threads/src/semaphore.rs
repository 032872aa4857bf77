//!
//! Semaphore - Counting Permits
//!
//! The counter goes negative while threads are blocked: `-n` means `n`
//! waiters. `acquire` (P) decrements and blocks on a notice when the result
//! is negative; `release` (V) increments and signals the notice when someone
//! was waiting. The notice banks the signal, so a release that lands between
//! a decrement and the matching block is not lost.
//!
//! Dropping a semaphore while the counter is below its starting count (a
//! permit still out, or a thread still blocked) is a contract violation.
//!

use concord_std_core::{contract, SyncError, SyncResult};

use crate::lock::Lock;
use crate::notice::{Notice, NoticeCounts, Tally};

#[derive(Debug)]
struct SemaphoreState {
    value: i64,
    blocked: NoticeCounts,
}

impl Tally for SemaphoreState {
    fn counts(&mut self, _slot: usize) -> &mut NoticeCounts {
        &mut self.blocked
    }

    fn peek(&self, _slot: usize) -> &NoticeCounts {
        &self.blocked
    }
}

#[derive(Debug)]
pub struct Semaphore {
    initial: i64,
    state: Lock<SemaphoreState>,
    blocked: Notice,
}

/// Returns its permit on drop
#[derive(Debug)]
pub struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

impl Semaphore {
    pub fn new(count: u32) -> Self {
        Self {
            initial: i64::from(count),
            state: Lock::new(SemaphoreState {
                value: i64::from(count),
                blocked: NoticeCounts::new(),
            }),
            blocked: Notice::new(),
        }
    }

    /// Current counter; negative values count blocked threads
    pub fn value(&self) -> i64 {
        self.state.acquire().value
    }

    /// P: take a permit, blocking while none is free
    pub fn acquire(&self) {
        let mut state = self.state.acquire();
        state.value -= 1;
        if state.value < 0 {
            self.blocked.wait(&mut state);
        }
    }

    /// Take a permit only if one is free right now
    pub fn try_acquire(&self) -> SyncResult<()> {
        let mut state = self.state.acquire();
        if state.value <= 0 {
            return Err(SyncError::Busy);
        }
        state.value -= 1;
        Ok(())
    }

    /// V: return a permit, waking one blocked thread if any
    pub fn release(&self) {
        let mut state = self.state.acquire();
        state.value += 1;
        if state.value <= 0 {
            self.blocked.signal(&mut state);
        }
    }

    /// `acquire` with the matching `release` tied to the returned guard
    pub fn permit(&self) -> Permit<'_> {
        self.acquire();
        Permit { semaphore: self }
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        let value = self.state.get_mut().value;
        if value < self.initial && !std::thread::panicking() {
            contract::violation("semaphore dropped while permits are held");
        }
    }
}
