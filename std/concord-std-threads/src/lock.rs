//!
//! Lock Facade
//!
//! Mutual exclusion over a value. Every top-level primitive in this crate
//! owns exactly one `Lock`; the notices and boards it is built from never own
//! one, they are handed the owner's guard on every call.
//!
//! Usage:
//! ```
//! use concord_std_threads::Lock;
//!
//! let lock = Lock::new(0i64);
//! {
//!     let mut value = lock.acquire();
//!     *value += 1;
//! }
//! assert_eq!(*lock.acquire(), 1);
//! ```
//!

use std::time::Instant;

use concord_std_core::{SyncError, SyncResult};
use parking_lot::{Mutex, MutexGuard, ReentrantMutex, ReentrantMutexGuard};

pub type LockGuard<'a, T> = MutexGuard<'a, T>;
pub type RecursiveLockGuard<'a, T> = ReentrantMutexGuard<'a, T>;

#[derive(Debug, Default)]
pub struct Lock<T> {
    inner: Mutex<T>,
}

impl<T> Lock<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Mutex::new(value) }
    }

    /// Block until the lock is held
    pub fn acquire(&self) -> LockGuard<'_, T> {
        self.inner.lock()
    }

    /// Take the lock only if nobody holds it
    pub fn try_acquire(&self) -> SyncResult<LockGuard<'_, T>> {
        self.inner.try_lock().ok_or(SyncError::Busy)
    }

    /// Block until the lock is held or `deadline` passes
    pub fn try_acquire_until(&self, deadline: Instant) -> SyncResult<LockGuard<'_, T>> {
        self.inner.try_lock_until(deadline).ok_or(SyncError::TimedOut)
    }

    /// Give the lock back. Dropping the guard does the same.
    pub fn release(guard: LockGuard<'_, T>) {
        drop(guard);
    }

    pub fn is_held(&self) -> bool {
        self.inner.is_locked()
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

/// Reentrant variant: the holding thread may acquire again without blocking.
/// Access through the guard is shared, so state behind it needs interior
/// mutability.
#[derive(Debug, Default)]
pub struct RecursiveLock<T> {
    inner: ReentrantMutex<T>,
}

impl<T> RecursiveLock<T> {
    pub fn new(value: T) -> Self {
        Self { inner: ReentrantMutex::new(value) }
    }

    pub fn acquire(&self) -> RecursiveLockGuard<'_, T> {
        self.inner.lock()
    }

    pub fn try_acquire(&self) -> SyncResult<RecursiveLockGuard<'_, T>> {
        self.inner.try_lock().ok_or(SyncError::Busy)
    }

    pub fn try_acquire_until(&self, deadline: Instant) -> SyncResult<RecursiveLockGuard<'_, T>> {
        self.inner.try_lock_until(deadline).ok_or(SyncError::TimedOut)
    }

    pub fn is_held(&self) -> bool {
        self.inner.is_locked()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}
