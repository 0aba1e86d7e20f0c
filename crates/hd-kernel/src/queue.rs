//! `EventQueue`: pending events ordered by (time, insertion sequence).
//!
//! Events for the same instant share one `VecDeque` bucket, so popping the
//! front of the earliest bucket yields them in the order they were pushed.
//! That FIFO tie-break is what makes two runs with the same seed replay
//! identically.

use std::collections::{BTreeMap, VecDeque};

use hd_core::SimTime;

/// A time-ordered queue of pending events of type `E`.
pub struct EventQueue<E> {
    inner: BTreeMap<SimTime, VecDeque<E>>,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { inner: BTreeMap::new(), total: 0 }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `event` at instant `at`, behind anything already queued for
    /// the same instant.
    pub fn push(&mut self, at: SimTime, event: E) {
        self.inner.entry(at).or_default().push_back(event);
        self.total += 1;
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        let mut entry = self.inner.first_entry()?;
        let at = *entry.key();
        let event = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        let event = event?;
        self.total -= 1;
        Some((at, event))
    }

    /// The earliest instant with at least one queued event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
