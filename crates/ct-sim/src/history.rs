//! Bounded ring of past snapshots, newest last.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::segment::Snapshot;

pub struct SnapshotHistory {
    capacity:  usize,
    snapshots: VecDeque<Arc<Snapshot>>,
}

impl SnapshotHistory {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, snapshots: VecDeque::with_capacity(capacity.min(1_024)) }
    }

    /// Append, evicting the oldest entry once full.
    pub fn push(&mut self, snapshot: Arc<Snapshot>) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Up to `n` most recent snapshots, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Arc<Snapshot>> {
        let skip = self.snapshots.len().saturating_sub(n);
        self.snapshots.iter().skip(skip).cloned().collect()
    }

    pub fn latest(&self) -> Option<&Arc<Snapshot>> {
        self.snapshots.back()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
