//! Bounded FIFO of field snapshots.
//!
//! Capacity is a const generic (must be > 0) so the buffer is statically
//! bounded and never reallocates its slot array. Pushing into a full buffer
//! evicts the oldest snapshot first.

use heapless::Deque;

use crate::config::HISTORY_LENGTH;
use crate::field::Field;

/// Rolling window of the most recent `H` field snapshots, oldest first.
pub struct HistoryBuffer<const H: usize = HISTORY_LENGTH> {
    frames: Deque<Field, H>,
}

impl<const H: usize> HistoryBuffer<H> {
    /// Empty buffer.
    pub const fn new() -> Self {
        Self {
            frames: Deque::new(),
        }
    }

    /// Maximum number of snapshots retained.
    pub const fn capacity(&self) -> usize {
        H
    }

    /// Append a snapshot, evicting the oldest when full.
    ///
    /// Returns the evicted snapshot, if any.
    pub fn push(&mut self, field: Field) -> Option<Field> {
        let evicted = if self.frames.is_full() {
            self.frames.pop_front()
        } else {
            None
        };
        // Cannot fail: a slot was freed above when the deque was full.
        let _ = self.frames.push_back(field);
        evicted
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` if no snapshot has been pushed.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Option<&Field> {
        self.frames.back()
    }

    /// Oldest retained snapshot.
    pub fn oldest(&self) -> Option<&Field> {
        self.frames.front()
    }

    /// Snapshots in chronological order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.frames.iter()
    }
}

impl<const H: usize> Default for HistoryBuffer<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const H: usize> Clone for HistoryBuffer<H> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        for f in self.iter() {
            out.push(f.clone());
        }
        out
    }
}

impl<const H: usize> core::fmt::Debug for HistoryBuffer<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HistoryBuffer")
            .field("len", &self.frames.len())
            .field("capacity", &H)
            .finish()
    }
}
