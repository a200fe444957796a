//! Snapshot providers.
//!
//! Everything downstream (classifier, detector, planner, HTTP handlers) reads
//! traffic through [`SnapshotProvider`], never through a global.  Tests inject
//! a [`FixedSnapshot`]; the server runs a [`LiveSnapshots`] that a timer
//! refreshes.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use ct_core::SimRng;

use crate::history::SnapshotHistory;
use crate::segment::Snapshot;
use crate::simulator::TrafficSimulator;

/// Source of the current traffic snapshot.
///
/// # Thread safety
///
/// Implementations are shared across request handlers, so they must be
/// `Send + Sync`.  The returned `Arc<Snapshot>` is immutable; a request holds
/// it for its whole lifetime regardless of refreshes happening meanwhile.
pub trait SnapshotProvider: Send + Sync {
    /// The snapshot representing "now".
    fn current(&self) -> Arc<Snapshot>;

    /// Up to `n` most recent snapshots, oldest first.  The last element is
    /// `current()` when history is kept.
    fn recent(&self, n: usize) -> Vec<Arc<Snapshot>> {
        if n == 0 { Vec::new() } else { vec![self.current()] }
    }

    /// Number of snapshots retained.
    fn history_len(&self) -> usize {
        1
    }
}

// ── FixedSnapshot ─────────────────────────────────────────────────────────────

/// A provider that always returns the same snapshot.
pub struct FixedSnapshot(Arc<Snapshot>);

impl FixedSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self(Arc::new(snapshot))
    }
}

impl SnapshotProvider for FixedSnapshot {
    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.0)
    }
}

// ── LiveSnapshots ─────────────────────────────────────────────────────────────

/// Periodically regenerated snapshot plus a bounded history.
pub struct LiveSnapshots {
    simulator: TrafficSimulator,
    rng:       Mutex<SimRng>,
    current:   RwLock<Arc<Snapshot>>,
    history:   Mutex<SnapshotHistory>,
}

impl LiveSnapshots {
    /// Create the provider and generate the first snapshot at `timestamp`.
    pub fn new(simulator: TrafficSimulator, mut rng: SimRng, history_capacity: usize, timestamp: i64) -> Self {
        let first = Arc::new(simulator.generate_snapshot(timestamp, &mut rng));
        let mut history = SnapshotHistory::new(history_capacity);
        history.push(Arc::clone(&first));

        Self {
            simulator,
            rng:     Mutex::new(rng),
            current: RwLock::new(first),
            history: Mutex::new(history),
        }
    }

    pub fn simulator(&self) -> &TrafficSimulator {
        &self.simulator
    }

    /// Generate a new snapshot for `timestamp` and swap it in.
    pub fn refresh(&self, timestamp: i64) -> Arc<Snapshot> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.advance(&mut rng, timestamp, false)
    }

    /// Drop all history and start over from a fresh snapshot.
    pub fn reset(&self, timestamp: i64) -> Arc<Snapshot> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.advance(&mut rng, timestamp, true);
        info!(timestamp, "snapshot history cleared");
        snapshot
    }

    /// Generate, record and publish one snapshot.  The `rng` guard serialises
    /// callers, so history order always matches publication order and the
    /// newest history entry is `current()`.
    fn advance(&self, rng: &mut SimRng, timestamp: i64, clear: bool) -> Arc<Snapshot> {
        let snapshot = Arc::new(self.simulator.generate_snapshot(timestamp, rng));

        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            if clear {
                history.clear();
            }
            history.push(Arc::clone(&snapshot));
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }
}

impl SnapshotProvider for LiveSnapshots {
    fn current(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    fn recent(&self, n: usize) -> Vec<Arc<Snapshot>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).recent(n)
    }

    fn history_len(&self) -> usize {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
