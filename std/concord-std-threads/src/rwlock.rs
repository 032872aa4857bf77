//!
//! RwLock - Readers/Writer Exclusion
//!
//! One counter encodes the whole state: `0` idle, `-1` a writer holds it,
//! `n > 0` that many readers are inside. Writers and readers block on
//! separate notices.
//!
//! Writers are preferred: a releasing writer hands over to a blocked writer
//! before it wakes readers, and new readers hold back while a writer is
//! queued, so a steady stream of readers cannot starve writers.
//!
//! Usage:
//! ```
//! use concord_std_threads::RwLock;
//!
//! let rw = RwLock::new();
//! {
//!     let _a = rw.read();
//!     let _b = rw.read();
//!     assert_eq!(rw.readers(), 2);
//! }
//! let _w = rw.write();
//! assert!(rw.is_writing());
//! ```
//!

use concord_std_core::{contract, SyncError, SyncResult};

use crate::lock::Lock;
use crate::notice::{Notice, NoticeCounts, Tally};

const WRITING: i64 = -1;
const IDLE: i64 = 0;

const WRITER_SLOT: usize = 0;
const READER_SLOT: usize = 1;

#[derive(Debug)]
struct RwState {
    counter: i64,
    slots: [NoticeCounts; 2],
}

impl Tally for RwState {
    fn counts(&mut self, slot: usize) -> &mut NoticeCounts {
        &mut self.slots[slot]
    }

    fn peek(&self, slot: usize) -> &NoticeCounts {
        &self.slots[slot]
    }
}

/// Decoded view of the counter at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RwLockState {
    Idle,
    Writing,
    Reading(usize),
}

#[derive(Debug)]
pub struct RwLock {
    state: Lock<RwState>,
    writers: Notice,
    readers: Notice,
}

/// Shared access; calls `leave` on drop
#[derive(Debug)]
pub struct ReadGuard<'a> {
    lock: &'a RwLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.leave();
    }
}

/// Exclusive access; calls `release` on drop
#[derive(Debug)]
pub struct WriteGuard<'a> {
    lock: &'a RwLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

impl RwLock {
    pub fn new() -> Self {
        Self {
            state: Lock::new(RwState {
                counter: IDLE,
                slots: [NoticeCounts::new(); 2],
            }),
            writers: Notice::for_slot(WRITER_SLOT),
            readers: Notice::for_slot(READER_SLOT),
        }
    }

    /// Raw counter: 0 idle, -1 writing, n > 0 readers
    pub fn counter(&self) -> i64 {
        self.state.acquire().counter
    }

    pub fn state(&self) -> RwLockState {
        match self.counter() {
            IDLE => RwLockState::Idle,
            WRITING => RwLockState::Writing,
            readers => RwLockState::Reading(readers as usize),
        }
    }

    pub fn is_writing(&self) -> bool {
        self.counter() == WRITING
    }

    pub fn readers(&self) -> usize {
        self.counter().max(0) as usize
    }

    /// Take exclusive access, blocking while anyone holds the lock
    pub fn acquire(&self) {
        let mut state = self.state.acquire();
        while state.counter != IDLE {
            self.writers.wait(&mut state);
        }
        state.counter = WRITING;
    }

    pub fn try_acquire(&self) -> SyncResult<()> {
        let mut state = self.state.acquire();
        if state.counter != IDLE {
            return Err(SyncError::Busy);
        }
        state.counter = WRITING;
        Ok(())
    }

    /// Drop exclusive access
    ///
    /// # Panics
    /// Releasing when no writer holds the lock is a contract violation.
    pub fn release(&self) {
        let mut state = self.state.acquire();
        if state.counter != WRITING {
            contract::violation("rwlock released without a writer");
        }
        state.counter = IDLE;
        if self.writers.ready(&state) {
            self.writers.signal(&mut state);
        } else {
            self.readers.broadcast(&mut state);
        }
    }

    /// Take shared access, blocking while a writer holds or waits for the lock
    pub fn enter(&self) {
        let mut state = self.state.acquire();
        while state.counter == WRITING || self.writers.ready(&state) {
            self.readers.wait(&mut state);
        }
        state.counter += 1;
    }

    pub fn try_enter(&self) -> SyncResult<()> {
        let mut state = self.state.acquire();
        if state.counter == WRITING || self.writers.ready(&state) {
            return Err(SyncError::Busy);
        }
        state.counter += 1;
        Ok(())
    }

    /// Drop shared access; the last reader out hands over to a queued writer
    ///
    /// # Panics
    /// Leaving when no reader is inside is a contract violation.
    pub fn leave(&self) {
        let mut state = self.state.acquire();
        if state.counter <= IDLE {
            contract::violation("rwlock left without a reader");
        }
        state.counter -= 1;
        if state.counter == IDLE && self.writers.ready(&state) {
            self.writers.signal(&mut state);
        }
    }

    pub fn read(&self) -> ReadGuard<'_> {
        self.enter();
        ReadGuard { lock: self }
    }

    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire();
        WriteGuard { lock: self }
    }
}

impl Default for RwLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RwLock {
    fn drop(&mut self) {
        let counter = self.state.get_mut().counter;
        if counter != IDLE && !std::thread::panicking() {
            contract::violation("rwlock dropped while held");
        }
    }
}
