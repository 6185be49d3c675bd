//! Generic partitioned canvas store over any [`StorageBackend`].
//!
//! [`GenericCanvasStore`] holds the storage-side domain logic: it encodes
//! headers and task records, writes each task into the partition for its
//! kind, and merges the partitions back into acceptance order on load. The
//! backend underneath only moves bytes.
//!
//! # Examples
//!
//! ```
//! use sketch::store::generic::GenericCanvasStore;
//! use sketch::store::memory::InMemoryBackend;
//!
//! let store = GenericCanvasStore::new(InMemoryBackend::new());
//! assert!(store.backend().is_empty());
//! ```

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Canvas;
use crate::error::{SketchError, SketchResult};
use crate::store::backend::{
    header_key, parse_task_key, task_key, tasks_prefix, StorageBackend, StorageError,
};
use crate::store::ordering::{merge_partitions, PartitionEntry};
use crate::store::record::{decode_header, decode_task, encode, CanvasHeader, TaskRecord};
use crate::store::CanvasRepository;

/// Canvas repository that stores every task kind in its own key range.
#[derive(Debug)]
pub struct GenericCanvasStore<B> {
    backend: B,
}

impl<B: StorageBackend> GenericCanvasStore<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn map_storage_error(err: StorageError, canvas_id: Uuid) -> SketchError {
        match err {
            StorageError::NotFound { .. } => SketchError::CanvasNotFound { id: canvas_id },
            StorageError::Backend { message, .. } => SketchError::Store(message),
        }
    }

    async fn load_header(&self, canvas_id: Uuid) -> SketchResult<CanvasHeader> {
        let data = self
            .backend
            .get(&header_key(canvas_id))
            .await
            .map_err(|e| Self::map_storage_error(e, canvas_id))?;
        decode_header(&data)
    }

    async fn load_partitions(
        &self,
        canvas_id: Uuid,
    ) -> SketchResult<BTreeMap<String, Vec<(String, Vec<u8>)>>> {
        let rows = self
            .backend
            .list_by_prefix(&tasks_prefix(canvas_id))
            .await
            .map_err(|e| Self::map_storage_error(e, canvas_id))?;

        let mut partitions: BTreeMap<String, Vec<(String, Vec<u8>)>> = BTreeMap::new();
        for (key, data) in rows {
            let Some((kind, _)) = parse_task_key(canvas_id, &key) else {
                tracing::warn!(canvas_id = %canvas_id, key = %key, "skipping malformed task key");
                continue;
            };
            partitions
                .entry(kind.to_string())
                .or_default()
                .push((key, data));
        }
        Ok(partitions)
    }
}

#[async_trait]
impl<B: StorageBackend> CanvasRepository for GenericCanvasStore<B> {
    async fn insert(&self, canvas: &Canvas) -> SketchResult<()> {
        let header = CanvasHeader::from(canvas);
        let data = encode(&header, "canvas header")?;
        let written = self
            .backend
            .put_if_absent(&header_key(canvas.id()), &data)
            .await
            .map_err(|e| Self::map_storage_error(e, canvas.id()))?;
        if written {
            tracing::debug!(canvas_id = %canvas.id(), "stored canvas header");
        } else {
            tracing::debug!(canvas_id = %canvas.id(), "canvas already stored, insert ignored");
        }
        Ok(())
    }

    async fn update(&self, canvas: &Canvas) -> SketchResult<()> {
        let canvas_id = canvas.id();
        self.load_header(canvas_id).await?;

        // Encode everything before the first write so a bad entry leaves
        // storage untouched.
        let records = canvas
            .entries()
            .iter()
            .map(|entry| TaskRecord::from_entry(canvas_id, entry))
            .collect::<SketchResult<Vec<_>>>()?;

        let stored: HashSet<String> = self
            .load_partitions(canvas_id)
            .await?
            .into_values()
            .flatten()
            .map(|(key, _)| key)
            .collect();

        let mut written = 0usize;
        for record in &records {
            let key = task_key(canvas_id, record.body.kind().as_str(), record.id);
            if stored.contains(&key) {
                continue;
            }
            let data = encode(record, "task record")?;
            if self
                .backend
                .put_if_absent(&key, &data)
                .await
                .map_err(|e| Self::map_storage_error(e, canvas_id))?
            {
                written += 1;
            }
        }
        tracing::debug!(canvas_id = %canvas_id, written, "persisted canvas tasks");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> SketchResult<Canvas> {
        let header = self.load_header(id).await?;
        let partitions = self.load_partitions(id).await?;

        let mut decoded: Vec<Vec<PartitionEntry>> = Vec::with_capacity(partitions.len());
        for (kind, rows) in partitions {
            let mut entries = Vec::with_capacity(rows.len());
            for (key, data) in &rows {
                let entry = decode_task(data)?;
                if entry.task.kind_tag() != kind {
                    tracing::warn!(
                        canvas_id = %id,
                        key = %key,
                        kind = %entry.task.kind_tag(),
                        "task record stored under the wrong partition"
                    );
                    return Err(SketchError::Store(format!(
                        "record {key} has kind {:?}, expected {kind:?}",
                        entry.task.kind_tag()
                    )));
                }
                entries.push(entry);
            }
            tracing::trace!(canvas_id = %id, kind = %kind, records = entries.len(), "loaded partition");
            decoded.push(entries);
        }

        Ok(Canvas::from_log(
            header.id,
            header.height,
            header.width,
            merge_partitions(decoded),
            header.created_at,
        ))
    }
}
