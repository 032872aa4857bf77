//!
//! concord-std-threads - Blocking Concurrency Primitives
//!
//! Thread synchronization and communication built directly on a mutex and
//! condition variables. Nothing here is lock-free and nothing is async: every
//! suspension is an OS thread blocking on a condition.
//!
//! ## Layering
//!
//! - `Lock` / `Condition` - facades over parking_lot, the only raw primitives
//! - `Notice` - counted wait/signal queue; counters live in the owner's lock
//! - `Board` - two- and three-slot rendezvous protocols built from notices
//! - `Channel`, `Entry`, `Barrier`, `RwLock`, `Semaphore` - each owns one
//!   `Lock`; notices and boards inside it only ever borrow its guard
//! - `Select` - guarded polling over entries
//! - `Future` - one-shot result delivered over a rendezvous channel
//!
//! ## Channels
//!
//! - `Channel::new(0)` - rendezvous, sender and receiver meet
//! - `Channel::new(1)` - one shared slot
//! - `Channel::new(n)` - ring buffer of `n` values
//! - `channel.close()` - receivers drain, then get `Scalar::ZERO`
//!
//! ## Errors
//!
//! Recoverable failures come back as `SyncError`. Programmer errors (sending
//! on a closed channel, setting a future twice, ...) panic through
//! `concord_std_core::contract`.
//!
//! ## Platform Support
//!
//! Native platforms only.
//!

pub mod clock;
pub mod config;
pub mod lock;
pub mod condition;
pub mod notice;
pub mod board;
pub mod channel;
pub mod entry;
pub mod select;
pub mod future;
pub mod barrier;
pub mod rwlock;
pub mod semaphore;
pub mod thread;

pub use config::*;
pub use lock::*;
pub use condition::*;
pub use notice::*;
pub use board::*;
pub use channel::*;
pub use entry::*;
pub use select::*;
pub use future::*;
pub use barrier::*;
pub use rwlock::*;
pub use semaphore::*;
pub use thread::{spawn, spawn_with, current_id, ThreadHandle, ThreadRegistry};

pub use concord_std_core::{Scalar, ScalarKind, SyncError, SyncResult};
