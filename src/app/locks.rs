//! Per-canvas mutual exclusion.
//!
//! Mutating a canvas is a read-modify-write against the repository: load,
//! append, persist. Two concurrent appends to the same canvas would both
//! read the same log and assign the same next sequence number, so every
//! mutation of a canvas runs under that canvas's lock. Different canvases
//! never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of one async mutex per canvas id.
///
/// Cloning shares the registry. Entries are never evicted: the registry
/// holds one mutex per canvas ever mutated, which is bounded by the number
/// of canvases since canvases are never deleted.
#[derive(Debug, Clone, Default)]
pub struct CanvasLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl CanvasLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `canvas_id`. The lock is released when
    /// the guard drops.
    pub async fn lock(&self, canvas_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(canvas_id).or_default().value());
        lock.lock_owned().await
    }

    /// Number of canvases that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns `true` if no canvas has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
