//! Bounded undo history — full paint-layer snapshots in a capped deque.
//!
//! There is deliberately no redo: committing while the index sits behind the
//! tail discards the abandoned suffix first.

use std::collections::VecDeque;

use crate::canvas::PixelBuffer;

/// Capped stack of paint-layer snapshots plus an index to the entry that
/// describes the current canvas state.
///
/// Invariants: `index < len` whenever the stack is non-empty; pushing past
/// the cap evicts the oldest entry and shifts the index down so it keeps
/// pointing at the same logical entry.
pub struct SnapshotHistory {
    entries: VecDeque<PixelBuffer>,
    index: usize,
    max_entries: usize,
}

impl SnapshotHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// There is something earlier than the current state to return to.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Record a new commit point.
    ///
    /// Entries past the current index (abandoned by an undo) are discarded
    /// before the push; exceeding the cap evicts the oldest entry.
    pub fn commit(&mut self, snapshot: PixelBuffer) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push_back(snapshot);
        self.index = self.entries.len() - 1;
        if self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.index -= 1;
        }
    }

    /// Step back one entry and return the snapshot to restore, or `None`
    /// when already at the oldest surviving entry (or empty).
    pub fn undo(&mut self) -> Option<&PixelBuffer> {
        if self.entries.is_empty() || self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Drop everything and restart from a single entry. This is the only
    /// path that discards the initial post-load snapshot.
    pub fn reset(&mut self, initial: PixelBuffer) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.index = 0;
    }

    /// Forget all entries (template reload).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    /// Snapshot describing the current canvas state.
    pub fn current(&self) -> Option<&PixelBuffer> {
        self.entries.get(self.index)
    }
}
