//!
//! Board - Multi-Party Rendezvous Protocols
//!
//! A board is a fixed row of notices sharing the owner's lock. Two-slot
//! boards implement the symmetric `meet` and the asymmetric `send`/`receive`
//! hand-off. Three-slot boards implement `call`/`accept`, which interleave as:
//!
//! ```text
//! caller                         acceptor
//! deposit request
//! signal(0)  ------------------> wait(0)
//!                                run handler
//! wait(1)    <------------------ signal(1)
//! collect reply
//! signal(2)  ------------------> wait(2)
//! ```
//!
//! Actions passed to `send`, `call` and `accept` run while the owner's lock is
//! held, between two fixed signal points. Notices cannot fail, so neither can
//! a protocol step; a thread that unwinds out of an action leaves the board in
//! a partial interleave that must not be resumed.
//!

use crate::lock::LockGuard;
use crate::notice::{Notice, Tally};

#[derive(Debug)]
pub struct Board<const N: usize> {
    notices: [Notice; N],
}

impl<const N: usize> Board<N> {
    /// Board whose slots map to tally slots `0..N`
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Board whose slots map to tally slots `first..first + N`
    pub fn starting_at(first: usize) -> Self {
        Self { notices: std::array::from_fn(|i| Notice::for_slot(first + i)) }
    }

    pub fn notice(&self, slot: usize) -> &Notice {
        &self.notices[slot]
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> Default for Board<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl Board<2> {
    /// Symmetric handshake: role 0 and role 1 each pass exactly once the other arrives
    pub fn meet<T: Tally>(&self, guard: &mut LockGuard<'_, T>, role: usize) {
        assert!(role < 2, "meet role must be 0 or 1, got {}", role);
        self.notices[role].signal(guard);
        self.notices[1 - role].wait(guard);
    }

    /// Wait for a receiver, run `action` to deposit the payload, release the receiver
    pub fn send<T: Tally, R>(&self, guard: &mut LockGuard<'_, T>, action: impl FnOnce(&mut T) -> R) -> R {
        self.notices[0].wait(guard);
        let result = action(&mut **guard);
        self.notices[1].signal(guard);
        result
    }

    /// Announce readiness and block until a sender has deposited
    pub fn receive<T: Tally>(&self, guard: &mut LockGuard<'_, T>) {
        self.notices[0].signal(guard);
        self.notices[1].wait(guard);
    }
}

impl Board<3> {
    /// Deposit a request, block until it has been handled, collect the reply
    pub fn call<T: Tally, R>(
        &self,
        guard: &mut LockGuard<'_, T>,
        deposit: impl FnOnce(&mut T),
        collect: impl FnOnce(&mut T) -> R,
    ) -> R {
        deposit(&mut **guard);
        self.notices[0].signal(guard);
        self.notices[1].wait(guard);
        let reply = collect(&mut **guard);
        self.notices[2].signal(guard);
        reply
    }

    /// Block until a call is pending, run the handler, and hold until the
    /// caller has collected the reply
    pub fn accept<T: Tally, R>(&self, guard: &mut LockGuard<'_, T>, action: impl FnOnce(&mut T) -> R) -> R {
        self.notices[0].wait(guard);
        let result = action(&mut **guard);
        self.notices[1].signal(guard);
        self.notices[2].wait(guard);
        result
    }
}
