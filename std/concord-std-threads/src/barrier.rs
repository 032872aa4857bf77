//!
//! Barrier - Cyclic N-Way Rendezvous
//!
//! `capacity` threads call `wait`; the last to arrive resets the count, starts
//! a new episode and wakes the rest. Waiters hold on to the episode they
//! arrived in and only leave once it has moved on, which covers spurious
//! wakeups and keeps a fast thread from slipping into the next cycle early.
//! Exactly one caller per episode is told it was the last.
//!

use concord_std_core::contract;

use crate::condition::Condition;
use crate::lock::Lock;

#[derive(Debug)]
struct BarrierState {
    remaining: usize,
    episode: u64,
}

#[derive(Debug)]
pub struct Barrier {
    capacity: usize,
    state: Lock<BarrierState>,
    released: Condition,
}

impl Barrier {
    /// # Panics
    /// A barrier needs at least two parties; fewer is a contract violation.
    pub fn new(capacity: usize) -> Self {
        contract::ensure(capacity >= 2, "barrier capacity must be at least 2");
        Self {
            capacity,
            state: Lock::new(BarrierState {
                remaining: capacity,
                episode: 0,
            }),
            released: Condition::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of completed episodes
    pub fn episode(&self) -> u64 {
        self.state.acquire().episode
    }

    /// Block until `capacity` threads have arrived. Returns true for the
    /// thread that released the others.
    pub fn wait(&self) -> bool {
        let mut state = self.state.acquire();
        state.remaining -= 1;

        if state.remaining == 0 {
            state.remaining = self.capacity;
            state.episode = state.episode.wrapping_add(1);
            self.released.broadcast();
            return true;
        }

        let episode = state.episode;
        while state.episode == episode {
            self.released.wait(&mut state);
        }
        false
    }
}
