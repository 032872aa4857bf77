//!
//! Thread Lifecycle and Registry
//!
//! Threads are plain OS threads, one per logical task. `spawn` moves an owned
//! argument into the new thread, so spawner and spawned share nothing after
//! the hand-off.
//!
//! Every thread started here gets a sequential id from the process-wide
//! `ThreadRegistry`. The registry is created on first use, the id is bound
//! before the entry point runs and released when it returns (or unwinds).
//! Threads not started here can opt in with `register_current`.
//!

use std::any::Any;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use concord_std_core::{SyncError, SyncResult};
use tracing::debug;

use crate::config::ThreadConfig;
use crate::lock::Lock;

#[derive(Debug)]
struct RegistryState {
    next_id: u64,
    live: HashMap<ThreadId, u64>,
}

/// Maps OS threads to small sequential ids for diagnostics
#[derive(Debug)]
pub struct ThreadRegistry {
    state: Lock<RegistryState>,
}

static REGISTRY: OnceLock<ThreadRegistry> = OnceLock::new();

impl ThreadRegistry {
    pub fn new() -> Self {
        Self {
            state: Lock::new(RegistryState {
                next_id: 1,
                live: HashMap::new(),
            }),
        }
    }

    /// The process-wide registry, created on first use
    pub fn global() -> &'static ThreadRegistry {
        REGISTRY.get_or_init(ThreadRegistry::new)
    }

    fn reserve_id(&self) -> u64 {
        let mut state = self.state.acquire();
        let id = state.next_id;
        state.next_id += 1;
        id
    }

    fn bind_current(&self, id: u64) {
        self.state.acquire().live.insert(thread::current().id(), id);
    }

    /// Give the calling thread an id, or return the one it already has
    pub fn register_current(&self) -> u64 {
        let current = thread::current().id();
        let mut state = self.state.acquire();
        if let Some(&id) = state.live.get(&current) {
            return id;
        }
        let id = state.next_id;
        state.next_id += 1;
        state.live.insert(current, id);
        id
    }

    pub fn unregister_current(&self) -> Option<u64> {
        self.state.acquire().live.remove(&thread::current().id())
    }

    pub fn id_of(&self, thread: ThreadId) -> Option<u64> {
        self.state.acquire().live.get(&thread).copied()
    }

    /// Number of threads currently holding an id
    pub fn live(&self) -> usize {
        self.state.acquire().live.len()
    }

    /// Teardown: forget every binding and restart numbering at 1.
    /// Only meaningful once every registered thread has been joined.
    pub fn reset(&self) {
        let mut state = self.state.acquire();
        state.live.clear();
        state.next_id = 1;
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct Registration {
    registry: &'static ThreadRegistry,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister_current();
    }
}

/// Handle to a spawned thread
#[derive(Debug)]
pub struct ThreadHandle<R> {
    id: u64,
    inner: JoinHandle<R>,
}

impl<R> ThreadHandle<R> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the thread to finish. A panic in the thread becomes `SyncError::Error`.
    pub fn join(self) -> SyncResult<R> {
        let id = self.id;
        let result = self.inner.join().map_err(|panic| {
            SyncError::failed(format!("thread {} panicked: {}", id, panic_message(panic.as_ref())))
        });
        debug!(thread = id, ok = result.is_ok(), "joined");
        result
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Run `entry(argument)` on a new thread with default settings
pub fn spawn<A, R, F>(entry: F, argument: A) -> SyncResult<ThreadHandle<R>>
where
    F: FnOnce(A) -> R + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    spawn_with(&ThreadConfig::default(), entry, argument)
}

/// Run `entry(argument)` on a new thread named and sized by `config`
pub fn spawn_with<A, R, F>(config: &ThreadConfig, entry: F, argument: A) -> SyncResult<ThreadHandle<R>>
where
    F: FnOnce(A) -> R + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    let registry = ThreadRegistry::global();
    let id = registry.reserve_id();

    let mut builder = thread::Builder::new().name(format!("{}-{}", config.name_prefix, id));
    if let Some(size) = config.stack_size {
        builder = builder.stack_size(size);
    }

    let inner = builder
        .spawn(move || {
            registry.bind_current(id);
            let _registration = Registration { registry };
            entry(argument)
        })
        .map_err(|e| SyncError::failed(format!("failed to spawn thread: {}", e)))?;

    debug!(thread = id, "spawned");
    Ok(ThreadHandle { id, inner })
}

/// Registry id of the calling thread, if it has one
pub fn current_id() -> Option<u64> {
    ThreadRegistry::global().id_of(thread::current().id())
}

pub fn yield_now() {
    thread::yield_now();
}

pub fn sleep(duration: Duration) {
    thread::sleep(duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_spawn_moves_argument_and_returns_result() {
        let handle = spawn(|values: Vec<i64>| values.iter().sum::<i64>(), vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(handle.join().unwrap(), 15);
    }

    #[test]
    fn test_spawned_thread_sees_its_id() {
        let handle = spawn(|_: ()| (current_id(), thread::current().id()), ()).unwrap();
        let id = handle.id();
        let (seen, os_thread) = handle.join().unwrap();
        assert_eq!(seen, Some(id));
        // released once the entry point returned
        assert_eq!(ThreadRegistry::global().id_of(os_thread), None);
    }

    #[test]
    fn test_thread_name_uses_prefix() {
        let config = ThreadConfig {
            name_prefix: "sieve".to_string(),
            stack_size: Some(256 * 1024),
        };
        let handle = spawn_with(&config, |_: ()| thread::current().name().map(str::to_string), ()).unwrap();
        let id = handle.id();
        assert_eq!(handle.join().unwrap(), Some(format!("sieve-{}", id)));
    }

    #[test]
    fn test_ids_are_sequential() {
        let counter = Arc::new(AtomicI64::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                spawn(|counter: Arc<AtomicI64>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }, Arc::clone(&counter))
                .unwrap()
            })
            .collect();

        let ids: Vec<u64> = handles.iter().map(ThreadHandle::id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_panicking_thread_is_an_error() {
        let handle = spawn(|_: ()| -> i64 { panic!("worker gave up") }, ()).unwrap();
        let err = handle.join().unwrap_err();
        assert!(err.to_string().contains("worker gave up"));
    }

    #[test]
    fn test_local_registry_register_and_reset() {
        let registry = ThreadRegistry::new();
        let id = registry.register_current();
        assert_eq!(id, 1);
        assert_eq!(registry.register_current(), 1);
        assert_eq!(registry.live(), 1);
        assert_eq!(registry.unregister_current(), Some(1));
        assert_eq!(registry.live(), 0);

        registry.register_current();
        registry.reset();
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.register_current(), 1);
    }
}
