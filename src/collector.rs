//! Thread-safe sample buffer.
//!
//! The collector is an unbounded append/drain buffer: hook invocations on
//! any number of threads `put` completed samples, and a reporting thread
//! drains everything currently buffered in one non-blocking call. Order is
//! not meaningful; the aggregator imposes its own grouping.

use crate::sample::Sample;
use log::debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Unbounded, thread-safe multiset of samples
#[derive(Debug, Default)]
pub struct Collector {
    buffer: Mutex<Vec<Sample>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample. Never blocks beyond the buffer's own mutex,
    /// never drops.
    pub fn put(&self, sample: Sample) {
        self.lock().push(sample);
    }

    /// Atomically remove and return everything currently buffered.
    ///
    /// Non-blocking; an empty result means nothing was pending, not a
    /// failure. Safe to call concurrently with `put`.
    pub fn drain_all(&self) -> Vec<Sample> {
        let drained = std::mem::take(&mut *self.lock());
        debug!("Drained {} samples from collector", drained.len());
        drained
    }

    /// Number of samples currently buffered
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // A panicking producer must not disable collection; recover the guard.
    fn lock(&self) -> MutexGuard<'_, Vec<Sample>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
