//!
//! Channels
//!
//! CSP-style channels carrying `Scalar` values. The requested capacity picks
//! the mode:
//!
//! - `0` - rendezvous: no buffering. A send completes only while a receiver is
//!   actively waiting, through a two-slot board. Receivers pass a gate one at a
//!   time so a deposited value is always collected before the next one lands.
//! - `1` - shared: one slot guarded by the `non_empty` / `non_full` monitor.
//! - `>1` - buffered: the same monitor over a ring buffer. Values come out in
//!   the order they went in; which blocked thread is served first is not
//!   specified.
//!
//! Closing is one-way. After `close`, receives drain what is buffered and
//! then return `Scalar::ZERO` forever without blocking. Sending on a closed
//! channel is a contract violation, never a status.
//!
//! Usage:
//! ```
//! use concord_std_threads::Channel;
//!
//! let channel = Channel::new(4).unwrap();
//! channel.send(1i64);
//! channel.send(2i64);
//! channel.close();
//! assert_eq!(channel.receive().as_int(), Some(1));
//! assert_eq!(channel.receive().as_int(), Some(2));
//! assert!(channel.receive().is_zero());
//! assert!(channel.is_drained());
//! ```
//!

use concord_std_core::{contract, Scalar, SyncError, SyncResult};
use tracing::trace;

use crate::board::Board;
use crate::condition::Condition;
use crate::lock::{Lock, LockGuard};
use crate::notice::{Notice, NoticeCounts, Tally};

const GATE_SLOT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Rendezvous,
    Shared,
    Buffered,
}

#[derive(Debug)]
enum Store {
    Slot(Scalar),
    Ring { buffer: Vec<Scalar>, front: usize },
}

impl Store {
    fn push(&mut self, occupation: usize, value: Scalar) {
        match self {
            Store::Slot(slot) => *slot = value,
            Store::Ring { buffer, front } => {
                let index = (*front + occupation) % buffer.len();
                buffer[index] = value;
            }
        }
    }

    fn pop(&mut self) -> Scalar {
        match self {
            Store::Slot(slot) => std::mem::take(slot),
            Store::Ring { buffer, front } => {
                let value = std::mem::take(&mut buffer[*front]);
                *front = (*front + 1) % buffer.len();
                value
            }
        }
    }
}

#[derive(Debug)]
struct ChannelState {
    store: Store,
    capacity: usize,
    occupation: usize,
    closed: bool,
    drained: bool,
    // rendezvous only: board slots 0 and 1, receiver gate at GATE_SLOT
    slots: [NoticeCounts; 3],
}

impl Tally for ChannelState {
    fn counts(&mut self, slot: usize) -> &mut NoticeCounts {
        &mut self.slots[slot]
    }

    fn peek(&self, slot: usize) -> &NoticeCounts {
        &self.slots[slot]
    }
}

#[derive(Debug)]
enum Signals {
    Monitor { non_empty: Condition, non_full: Condition },
    Rendezvous { board: Board<2>, gate: Notice },
}

#[derive(Debug)]
pub struct Channel {
    mode: ChannelMode,
    state: Lock<ChannelState>,
    signals: Signals,
}

impl Channel {
    /// Create a channel; `capacity` 0 is rendezvous, 1 shared, more buffered.
    /// Fails with `OutOfMemory` when the ring buffer cannot be allocated.
    pub fn new(capacity: usize) -> SyncResult<Self> {
        let (mode, store) = match capacity {
            0 => (ChannelMode::Rendezvous, Store::Slot(Scalar::ZERO)),
            1 => (ChannelMode::Shared, Store::Slot(Scalar::ZERO)),
            n => {
                let mut buffer = Vec::new();
                buffer
                    .try_reserve_exact(n)
                    .map_err(|_| SyncError::OutOfMemory { requested: n })?;
                buffer.resize(n, Scalar::ZERO);
                (ChannelMode::Buffered, Store::Ring { buffer, front: 0 })
            }
        };

        let signals = match mode {
            ChannelMode::Rendezvous => Signals::Rendezvous {
                board: Board::new(),
                gate: Notice::for_slot(GATE_SLOT),
            },
            _ => Signals::Monitor {
                non_empty: Condition::new(),
                non_full: Condition::new(),
            },
        };

        let mut slots = [NoticeCounts::new(); 3];
        slots[GATE_SLOT] = NoticeCounts::with_permits(1);

        Ok(Self {
            mode,
            state: Lock::new(ChannelState {
                store,
                capacity: capacity.max(1),
                occupation: 0,
                closed: false,
                drained: false,
                slots,
            }),
            signals,
        })
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Normalized capacity (a rendezvous channel reports 1)
    pub fn capacity(&self) -> usize {
        self.state.acquire().capacity
    }

    /// Number of values deposited and not yet received
    pub fn len(&self) -> usize {
        self.state.acquire().occupation
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.acquire().closed
    }

    /// Closed and every value handed out
    pub fn is_drained(&self) -> bool {
        self.state.acquire().drained
    }

    /// Send a value, blocking while the channel is full (or, in rendezvous
    /// mode, until a receiver takes it).
    ///
    /// # Panics
    /// Sending on a closed channel is a contract violation.
    pub fn send(&self, value: impl Into<Scalar>) {
        let value = value.into();
        let mut state = self.state.acquire();
        if state.closed {
            contract::violation("send on closed channel");
        }

        match &self.signals {
            Signals::Rendezvous { board, .. } => {
                board.send(&mut state, |state| {
                    if state.closed {
                        contract::violation("channel closed while a send was blocked");
                    }
                    state.store.push(state.occupation, value);
                    state.occupation += 1;
                });
            }
            Signals::Monitor { non_empty, non_full } => {
                while state.occupation == state.capacity {
                    non_full.wait(&mut state);
                    if state.closed {
                        contract::violation("channel closed while a send was blocked");
                    }
                }
                let occupation = state.occupation;
                state.store.push(occupation, value);
                state.occupation += 1;
                non_empty.signal();
            }
        }
    }

    /// Receive the next value, blocking while the channel is empty and open.
    /// A drained channel returns `Scalar::ZERO` immediately.
    pub fn receive(&self) -> Scalar {
        let mut state = self.state.acquire();
        match &self.signals {
            Signals::Rendezvous { board, gate } => Self::receive_rendezvous(&mut state, board, gate),
            Signals::Monitor { non_empty, non_full } => {
                loop {
                    if state.drained {
                        return Scalar::ZERO;
                    }
                    if state.occupation > 0 {
                        break;
                    }
                    if state.closed {
                        Self::mark_drained(&mut state);
                        return Scalar::ZERO;
                    }
                    non_empty.wait(&mut state);
                }
                let value = Self::take(&mut state);
                non_full.signal();
                value
            }
        }
    }

    fn receive_rendezvous(state: &mut LockGuard<'_, ChannelState>, board: &Board<2>, gate: &Notice) -> Scalar {
        if state.closed {
            // a value still in flight belongs to the receiver already waiting for it
            if state.occupation == 0 {
                Self::mark_drained(state);
            }
            return Scalar::ZERO;
        }

        gate.wait(state);
        if state.closed {
            if state.occupation == 0 {
                Self::mark_drained(state);
            }
            gate.signal(state);
            return Scalar::ZERO;
        }

        board.receive(state);
        let value = if state.occupation == 0 {
            // released by close, nothing was deposited
            Self::mark_drained(state);
            Scalar::ZERO
        } else {
            Self::take(state)
        };
        gate.signal(state);
        value
    }

    fn take(state: &mut ChannelState) -> Scalar {
        let value = state.store.pop();
        state.occupation -= 1;
        if state.closed && state.occupation == 0 {
            Self::mark_drained(state);
        }
        value
    }

    fn mark_drained(state: &mut ChannelState) {
        if !state.drained {
            state.drained = true;
            trace!("channel drained");
        }
    }

    /// Close the channel. Receivers drain what is buffered; blocked threads
    /// are woken to observe the close. Closing twice is a no-op.
    pub fn close(&self) {
        let mut state = self.state.acquire();
        if state.closed {
            return;
        }
        state.closed = true;
        trace!(occupation = state.occupation, mode = ?self.mode, "channel closed");
        if state.occupation == 0 {
            Self::mark_drained(&mut state);
        }

        match &self.signals {
            Signals::Monitor { non_empty, non_full } => {
                non_empty.broadcast();
                non_full.broadcast();
            }
            Signals::Rendezvous { board, gate } => {
                board.notice(0).broadcast(&mut state);
                board.notice(1).broadcast(&mut state);
                gate.broadcast(&mut state);
            }
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        let occupation = self.state.get_mut().occupation;
        if occupation != 0 && !std::thread::panicking() {
            contract::violation("channel dropped while holding values");
        }
    }
}
