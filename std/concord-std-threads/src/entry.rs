//!
//! Entry - Synchronous Request/Reply Mailbox
//!
//! A client `call`s with a request and blocks until a server `accept`s it,
//! runs its handler and the client has read the reply. One call is in flight
//! at a time: further callers queue at a gate until the current call/accept
//! cycle has fully completed, so a reply always reaches the caller whose
//! request produced it.
//!
//! Usage:
//! ```
//! use std::sync::Arc;
//! use concord_std_threads::Entry;
//!
//! let entry = Arc::new(Entry::new());
//! let server = {
//!     let entry = Arc::clone(&entry);
//!     std::thread::spawn(move || entry.accept(|query| (query.as_int().unwrap() + 1).into()))
//! };
//! assert_eq!(entry.call(41i64).as_int(), Some(42));
//! server.join().unwrap();
//! ```
//!

use concord_std_core::Scalar;

use crate::board::Board;
use crate::lock::Lock;
use crate::notice::{Notice, NoticeCounts, Tally};

const GATE_SLOT: usize = 3;

#[derive(Debug)]
struct EntryState {
    query: Scalar,
    reply: Scalar,
    // board slots 0..3, caller gate at GATE_SLOT
    slots: [NoticeCounts; 4],
}

impl Tally for EntryState {
    fn counts(&mut self, slot: usize) -> &mut NoticeCounts {
        &mut self.slots[slot]
    }

    fn peek(&self, slot: usize) -> &NoticeCounts {
        &self.slots[slot]
    }
}

#[derive(Debug)]
pub struct Entry {
    state: Lock<EntryState>,
    board: Board<3>,
    gate: Notice,
}

impl Entry {
    pub fn new() -> Self {
        let mut slots = [NoticeCounts::new(); 4];
        slots[GATE_SLOT] = NoticeCounts::with_permits(1);
        Self {
            state: Lock::new(EntryState {
                query: Scalar::ZERO,
                reply: Scalar::ZERO,
                slots,
            }),
            board: Board::new(),
            gate: Notice::for_slot(GATE_SLOT),
        }
    }

    /// Issue a request and block until its reply is available
    pub fn call(&self, request: impl Into<Scalar>) -> Scalar {
        let request = request.into();
        let mut state = self.state.acquire();
        self.gate.wait(&mut state);
        let reply = self.board.call(
            &mut state,
            |entry| entry.query = request,
            |entry| entry.reply,
        );
        self.gate.signal(&mut state);
        reply
    }

    /// Wait for a call, answer it with `handler`, and return once the caller
    /// has collected the reply. The handler runs under the entry's lock and
    /// must not call back into this entry.
    pub fn accept<F>(&self, handler: F)
    where
        F: FnOnce(Scalar) -> Scalar,
    {
        let mut state = self.state.acquire();
        self.board.accept(&mut state, |entry| entry.reply = handler(entry.query));
    }

    /// Whether a caller has announced a request that has not been accepted yet
    pub fn ready(&self) -> bool {
        let state = self.state.acquire();
        self.board.notice(0).pending(&state)
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_call_returns_handler_reply() {
        let entry = Arc::new(Entry::new());

        let server = {
            let entry = Arc::clone(&entry);
            thread::spawn(move || {
                for _ in 0..3 {
                    entry.accept(|query| Scalar::Int(query.as_int().unwrap() * 10));
                }
            })
        };

        for i in 1..=3i64 {
            assert_eq!(entry.call(i), Scalar::Int(i * 10));
        }
        server.join().unwrap();
    }

    #[test]
    fn test_ready_reflects_pending_call() {
        let entry = Arc::new(Entry::new());
        assert!(!entry.ready());

        let client = {
            let entry = Arc::clone(&entry);
            thread::spawn(move || entry.call(5i64))
        };

        while !entry.ready() {
            thread::yield_now();
        }
        entry.accept(|query| query);
        assert!(!entry.ready());
        assert_eq!(client.join().unwrap(), Scalar::Int(5));
    }
}
