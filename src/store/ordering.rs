//! Restoring acceptance order when a canvas is loaded from partitions.
//!
//! A partitioned store keeps each task kind in its own table or key range,
//! so loading a canvas yields one unordered batch per kind. This module
//! merges those batches back into a single log.
//!
//! Records are merged with a stable sort on `(sequence, created_at, id)`,
//! which reproduces acceptance order exactly. Records written before
//! sequence numbers existed cannot be placed by sequence; they always
//! predate the sequenced ones, so they form a prefix ordered by
//! `(created_at, id)` and are numbered from 1. Sequenced records keep their
//! stored number unless it would not exceed the entry before it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{LogEntry, Task};

/// A task as it comes out of one partition, with its ordering fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    /// Acceptance sequence, if the record has one.
    pub sequence: Option<u64>,
    /// Submission time, if the record has one.
    pub created_at: Option<DateTime<Utc>>,
    /// The decoded task.
    pub task: Task,
}

impl PartitionEntry {
    fn fallback_key(&self) -> (Option<DateTime<Utc>>, Option<Uuid>) {
        (self.created_at, self.task.id())
    }
}

/// Merges per-kind partitions into one log in acceptance order.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use sketch::domain::{Fill, Point, Task};
/// use sketch::store::ordering::{merge_partitions, PartitionEntry};
/// use uuid::Uuid;
///
/// let fill = |seq| PartitionEntry {
///     sequence: Some(seq),
///     created_at: Some(Utc::now()),
///     task: Task::Fill(Fill::new(Uuid::new_v4(), Point::new(0, 0), '-', Utc::now())),
/// };
///
/// let log = merge_partitions(vec![vec![fill(3), fill(1)], vec![fill(2)]]);
/// let order: Vec<u64> = log.iter().map(|e| e.sequence).collect();
/// assert_eq!(order, vec![1, 2, 3]);
/// ```
pub fn merge_partitions<I>(partitions: I) -> Vec<LogEntry>
where
    I: IntoIterator<Item = Vec<PartitionEntry>>,
{
    let (mut legacy, mut sequenced): (Vec<PartitionEntry>, Vec<PartitionEntry>) = partitions
        .into_iter()
        .flatten()
        .partition(|entry| entry.sequence.is_none());

    if !legacy.is_empty() {
        tracing::debug!(
            legacy = legacy.len(),
            sequenced = sequenced.len(),
            "records without sequence numbers, ordering them first by creation time"
        );
    }
    legacy.sort_by(|a, b| a.fallback_key().cmp(&b.fallback_key()));
    sequenced.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| a.fallback_key().cmp(&b.fallback_key()))
    });

    let mut log = Vec::with_capacity(legacy.len() + sequenced.len());
    let mut last = 0u64;
    for entry in legacy.into_iter().chain(sequenced) {
        // Sequences must stay strictly increasing after the legacy prefix
        // or a duplicate.
        last = entry.sequence.map_or(last + 1, |stored| stored.max(last + 1));
        log.push(LogEntry {
            sequence: last,
            task: entry.task,
        });
    }
    log
}
