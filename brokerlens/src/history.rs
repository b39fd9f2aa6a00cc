//! Capture-ordered timeline of snapshots for one lens.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::{CapturedSnapshot, SnapshotId};

/// Default number of captures a lens retains.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Bounded, append-only record of captures in the order they completed.
///
/// Once `capacity` captures are held, appending evicts the oldest. Entries
/// are shared (`Arc`), so cloning a history is cheap and the clone is an
/// independent view that later captures do not change.
///
/// When captures run concurrently on one lens, entries appear in the order
/// each capture finished assembling, which need not match the order
/// `take_snapshot` was called.
#[derive(Debug)]
pub struct History<T> {
    entries: VecDeque<Arc<CapturedSnapshot<T>>>,
    capacity: usize,
    total_captured: u64,
}

impl<T> History<T> {
    /// Create an empty history retaining at most `capacity` captures
    /// (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            total_captured: 0,
        }
    }

    /// Append a capture, returning the entry evicted to make room, if any.
    pub(crate) fn push(
        &mut self,
        captured: Arc<CapturedSnapshot<T>>,
    ) -> Option<Arc<CapturedSnapshot<T>>> {
        self.total_captured += 1;
        self.entries.push_back(captured);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Number of retained captures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been captured (or retained).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained captures.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Captures ever appended, including ones since evicted.
    pub fn total_captured(&self) -> u64 {
        self.total_captured
    }

    /// Captures dropped to stay within capacity.
    pub fn evicted(&self) -> u64 {
        self.total_captured - self.entries.len() as u64
    }

    /// Iterate from oldest to newest.
    pub fn iter(
        &self,
    ) -> impl DoubleEndedIterator<Item = &Arc<CapturedSnapshot<T>>> + ExactSizeIterator {
        self.entries.iter()
    }

    /// The most recent capture.
    pub fn latest(&self) -> Option<&Arc<CapturedSnapshot<T>>> {
        self.entries.back()
    }

    /// The oldest retained capture.
    pub fn oldest(&self) -> Option<&Arc<CapturedSnapshot<T>>> {
        self.entries.front()
    }

    /// Look up a retained capture by id.
    pub fn get(&self, id: &SnapshotId) -> Option<&Arc<CapturedSnapshot<T>>> {
        self.entries.iter().find(|c| c.id() == id)
    }

    /// Retained captures taken at or after `timestamp_ms`, oldest first.
    pub fn since(&self, timestamp_ms: u64) -> impl Iterator<Item = &Arc<CapturedSnapshot<T>>> {
        self.entries
            .iter()
            .filter(move |c| c.timestamp_ms() >= timestamp_ms)
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> Clone for History<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            capacity: self.capacity,
            total_captured: self.total_captured,
        }
    }
}

impl<'a, T> IntoIterator for &'a History<T> {
    type Item = &'a Arc<CapturedSnapshot<T>>;
    type IntoIter = std::collections::vec_deque::Iter<'a, Arc<CapturedSnapshot<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
