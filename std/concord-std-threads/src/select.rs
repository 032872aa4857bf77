//!
//! Select - Guarded Choice over Entries
//!
//! A server loop over a fixed set of alternatives, each an `Entry` with a
//! guard and a handler. One pass scans the alternatives in order, skips those
//! whose guard is false, and accepts the first entry with a pending call.
//!
//! There is no blocking wait across several entries underneath, so a pass
//! that finds open guards but no caller backs off (per `SelectConfig`) and
//! scans again. The scan order also means earlier alternatives win ties;
//! nothing here is fair across entries.
//!

use std::hint;
use std::thread;
use std::time::Duration;

use concord_std_core::{contract, Scalar};
use tracing::trace;

use crate::config::{PollStrategy, SelectConfig};
use crate::entry::Entry;

/// Outcome of one scan over the alternatives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// The alternative at this index was accepted and its handler ran
    Served(usize),
    /// At least one guard is open but no call is pending
    Idle,
    /// Every guard is false
    Closed,
}

struct Alternative<'a> {
    guard: Box<dyn FnMut() -> bool + 'a>,
    entry: &'a Entry,
    handler: Box<dyn FnMut(Scalar) -> Scalar + 'a>,
}

pub struct Select<'a> {
    alternatives: Vec<Alternative<'a>>,
    config: SelectConfig,
}

impl<'a> Select<'a> {
    pub fn new() -> Self {
        Self::with_config(&SelectConfig::default())
    }

    pub fn with_config(config: &SelectConfig) -> Self {
        Self {
            alternatives: Vec::new(),
            config: config.clone(),
        }
    }

    /// Add an alternative served only while `guard` returns true
    pub fn when<G, H>(mut self, guard: G, entry: &'a Entry, handler: H) -> Self
    where
        G: FnMut() -> bool + 'a,
        H: FnMut(Scalar) -> Scalar + 'a,
    {
        self.alternatives.push(Alternative {
            guard: Box::new(guard),
            entry,
            handler: Box::new(handler),
        });
        self
    }

    /// Add an alternative that is always open
    pub fn on<H>(self, entry: &'a Entry, handler: H) -> Self
    where
        H: FnMut(Scalar) -> Scalar + 'a,
    {
        self.when(|| true, entry, handler)
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// One scan: serve the first open alternative with a pending call
    pub fn poll_once(&mut self) -> Poll {
        let mut open = false;
        for (index, alternative) in self.alternatives.iter_mut().enumerate() {
            if !(alternative.guard)() {
                continue;
            }
            open = true;
            if alternative.entry.ready() {
                let handler = &mut alternative.handler;
                alternative.entry.accept(|query| handler(query));
                return Poll::Served(index);
            }
        }
        if open { Poll::Idle } else { Poll::Closed }
    }

    /// Scan until one alternative has been served and return its index.
    ///
    /// # Panics
    /// Selecting with every guard false is a contract violation.
    pub fn select(&mut self) -> usize {
        let mut idle_passes = 0u32;
        loop {
            match self.poll_once() {
                Poll::Served(index) => return index,
                Poll::Closed => contract::violation("select with no open alternative"),
                Poll::Idle => self.back_off(&mut idle_passes),
            }
        }
    }

    /// Serve calls until every guard is false. Returns how many were served.
    pub fn serve(&mut self) -> usize {
        let mut served = 0;
        let mut idle_passes = 0u32;
        loop {
            match self.poll_once() {
                Poll::Served(index) => {
                    trace!(alternative = index, "select served");
                    served += 1;
                    idle_passes = 0;
                }
                Poll::Closed => return served,
                Poll::Idle => self.back_off(&mut idle_passes),
            }
        }
    }

    fn back_off(&self, idle_passes: &mut u32) {
        match self.config.poll {
            PollStrategy::Yield => thread::yield_now(),
            PollStrategy::Spin => {
                if *idle_passes < self.config.spin_limit {
                    *idle_passes += 1;
                    hint::spin_loop();
                } else {
                    thread::yield_now();
                }
            }
            PollStrategy::Sleep => thread::sleep(Duration::from_micros(self.config.sleep_micros)),
        }
    }
}

impl Default for Select<'_> {
    fn default() -> Self {
        Self::new()
    }
}
