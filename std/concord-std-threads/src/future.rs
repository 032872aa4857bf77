//!
//! Future - One-Shot Deferred Result
//!
//! `Future::fork` runs a function on a new thread and hands it a `Promise`.
//! The function delivers its result with `Promise::set`, which is a send on
//! an internal rendezvous channel. The owning thread collects it with `get`
//! (repeatable, memoized) or `join` (also reaps the thread).
//!
//! A promise dropped without a value closes the channel, so a producer that
//! returns early or panics turns into an error on `get` instead of a hang.
//!
//! Dropping a forked future that was never collected receives the value and
//! reaps the producer, so its `set` never blocks against a missing receiver.
//! A future made with `promise` has no thread to reap; dropping it before its
//! value arrives is a contract violation.
//!
//! Usage:
//! ```
//! use concord_std_threads::Future;
//!
//! let future = Future::fork(|promise, n: i64| promise.set(n * n), 12).unwrap();
//! assert_eq!(future.join().unwrap().as_int(), Some(144));
//! ```
//!

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use concord_std_core::{contract, Scalar, SyncError, SyncResult};
use tracing::debug;

use crate::channel::Channel;
use crate::thread::{self, ThreadHandle};

#[derive(Debug)]
struct Slot {
    channel: Channel,
    set: AtomicBool,
}

/// Producer side: delivers the value exactly once
#[derive(Debug)]
pub struct Promise {
    slot: Arc<Slot>,
}

impl Promise {
    /// Deliver the value, blocking until the future's owner receives it.
    ///
    /// # Panics
    /// Setting a promise a second time is a contract violation.
    pub fn set(&self, value: impl Into<Scalar>) {
        if self.slot.set.swap(true, Ordering::SeqCst) {
            contract::violation("future set twice");
        }
        self.slot.channel.send(value);
    }

    pub fn is_set(&self) -> bool {
        self.slot.set.load(Ordering::SeqCst)
    }
}

impl Drop for Promise {
    fn drop(&mut self) {
        if !self.slot.set.load(Ordering::SeqCst) {
            self.slot.channel.close();
        }
    }
}

/// Consumer side of a one-shot result
#[derive(Debug)]
pub struct Future {
    slot: Option<Arc<Slot>>,
    result: Scalar,
    finished: bool,
    thread: Option<ThreadHandle<()>>,
}

impl Future {
    /// A future and its promise, with no thread attached
    pub fn promise() -> SyncResult<(Future, Promise)> {
        let slot = Arc::new(Slot {
            channel: Channel::new(0)?,
            set: AtomicBool::new(false),
        });
        let future = Future {
            slot: Some(Arc::clone(&slot)),
            result: Scalar::ZERO,
            finished: false,
            thread: None,
        };
        Ok((future, Promise { slot }))
    }

    /// Spawn a thread running `function(&promise, argument)`
    pub fn fork<A, F>(function: F, argument: A) -> SyncResult<Future>
    where
        F: FnOnce(&Promise, A) + Send + 'static,
        A: Send + 'static,
    {
        let (mut future, promise) = Future::promise()?;
        let handle = thread::spawn(
            move |(promise, argument): (Promise, A)| function(&promise, argument),
            (promise, argument),
        )?;
        future.thread = Some(handle);
        Ok(future)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block for the value on the first call; later calls return the same value.
    /// Fails if the producer went away without setting it.
    pub fn get(&mut self) -> SyncResult<Scalar> {
        if self.finished {
            return Ok(self.result);
        }
        let slot = self
            .slot
            .as_ref()
            .ok_or_else(|| SyncError::failed("future has no producer"))?;

        let value = slot.channel.receive();
        if slot.channel.is_drained() {
            return Err(SyncError::failed("producer finished without setting a value"));
        }

        self.result = value;
        self.finished = true;
        // the channel is no longer needed once the value is memoized
        self.slot = None;
        Ok(value)
    }

    /// `get`, then wait for the producing thread to exit
    pub fn join(mut self) -> SyncResult<Scalar> {
        let value = self.get();
        if let Some(handle) = self.thread.take() {
            handle.join()?;
        }
        value
    }
}

impl Drop for Future {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let outstanding = !self.finished
            && self
                .slot
                .as_ref()
                .is_some_and(|slot| !slot.channel.is_drained());

        match self.thread.take() {
            Some(handle) => {
                if outstanding {
                    let _ = self.get();
                }
                if let Err(e) = handle.join() {
                    debug!(error = %e, "future producer failed");
                }
            }
            None if outstanding => contract::violation("future dropped before its result was collected"),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread as std_thread;

    #[test]
    fn test_get_is_memoized() {
        let mut future = Future::fork(|promise, seed: i64| promise.set(seed + 1), 41).unwrap();
        assert!(!future.is_finished());
        assert_eq!(future.get().unwrap(), Scalar::Int(42));
        assert!(future.is_finished());
        assert_eq!(future.get().unwrap(), Scalar::Int(42));
        assert_eq!(future.join().unwrap(), Scalar::Int(42));
    }

    #[test]
    fn test_promise_without_thread() {
        let (mut future, promise) = Future::promise().unwrap();
        let producer = std_thread::spawn(move || promise.set(2.5));
        assert_eq!(future.get().unwrap(), Scalar::Float(2.5));
        producer.join().unwrap();
    }

    #[test]
    fn test_dropped_promise_is_an_error() {
        let mut future = Future::fork(|_promise, _: ()| {}, ()).unwrap();
        assert!(future.get().is_err());
        // stays an error, never blocks
        assert!(future.get().is_err());
    }

    #[test]
    fn test_panicking_producer_fails_join() {
        let future = Future::fork(|_promise, _: ()| panic!("no result today"), ()).unwrap();
        let err = future.join().unwrap_err();
        assert!(err.to_string().contains("no result today"));
    }

    #[test]
    #[should_panic(expected = "future set twice")]
    fn test_second_set_panics() {
        let (mut future, promise) = Future::promise().unwrap();
        let promise = Arc::new(promise);
        let producer = {
            let promise = Arc::clone(&promise);
            std_thread::spawn(move || promise.set(1i64))
        };
        assert_eq!(future.get().unwrap(), Scalar::Int(1));
        producer.join().unwrap();
        assert!(future.is_finished());
        promise.set(2i64);
    }

    #[test]
    fn test_drop_releases_blocked_producer() {
        let returned = Arc::new(AtomicBool::new(false));
        let future = Future::fork(
            |promise, returned: Arc<AtomicBool>| {
                promise.set(7i64);
                returned.store(true, Ordering::SeqCst);
            },
            Arc::clone(&returned),
        )
        .unwrap();

        drop(future);
        assert!(returned.load(Ordering::SeqCst));
    }

    #[test]
    fn test_drop_after_failed_get_is_quiet() {
        let mut future = Future::fork(|_promise, _: ()| {}, ()).unwrap();
        assert!(future.get().is_err());
        drop(future);
    }

    #[test]
    #[should_panic(expected = "future dropped before its result was collected")]
    fn test_drop_uncollected_promise_pair_panics() {
        let (future, _promise) = Future::promise().unwrap();
        drop(future);
    }
}
