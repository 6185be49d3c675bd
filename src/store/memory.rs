//! In-memory storage.
//!
//! Two flavours live here:
//!
//! - [`InMemoryCanvasRepository`] is an arena of whole canvases keyed by id
//!   behind a single read/write lock. Readers run concurrently; a writer
//!   excludes everyone. It is the default repository for development and
//!   tests.
//! - [`InMemoryBackend`] is a dumb [`StorageBackend`] over [`DashMap`] for
//!   [`GenericCanvasStore`], giving a partitioned store without a database.
//!
//! # Examples
//!
//! ```
//! use sketch::store::memory::{InMemoryCanvasRepository, PartitionedMemoryStore};
//!
//! let arena = InMemoryCanvasRepository::new();
//! assert!(arena.is_empty());
//!
//! let partitioned = PartitionedMemoryStore::new(Default::default());
//! assert!(partitioned.backend().is_empty());
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{Canvas, LogEntry, Task};
use crate::error::{SketchError, SketchResult};
use crate::store::backend::{StorageBackend, StorageError};
use crate::store::generic::GenericCanvasStore;
use crate::store::CanvasRepository;

// ---- InMemoryCanvasRepository: arena of canvases ----

/// Arena of canvases keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryCanvasRepository {
    canvases: RwLock<HashMap<Uuid, Canvas>>,
}

impl InMemoryCanvasRepository {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored canvases.
    pub fn len(&self) -> usize {
        self.canvases.read().len()
    }

    /// Returns `true` if no canvas is stored.
    pub fn is_empty(&self) -> bool {
        self.canvases.read().is_empty()
    }
}

#[async_trait]
impl CanvasRepository for InMemoryCanvasRepository {
    async fn insert(&self, canvas: &Canvas) -> SketchResult<()> {
        let mut canvases = self.canvases.write();
        if canvases.contains_key(&canvas.id()) {
            tracing::debug!(canvas_id = %canvas.id(), "canvas already stored, insert ignored");
            return Ok(());
        }
        // Only the header is persisted on insert.
        let header = Canvas::new(canvas.id(), canvas.height(), canvas.width(), canvas.created_at());
        canvases.insert(canvas.id(), header);
        Ok(())
    }

    async fn update(&self, canvas: &Canvas) -> SketchResult<()> {
        if let Some(Task::Unrecognized(unknown)) = canvas
            .tasks()
            .find(|task| matches!(task, Task::Unrecognized(_)))
        {
            return Err(SketchError::InvalidTask {
                task_id: unknown.id,
                kind: unknown.kind.clone(),
            });
        }

        let mut canvases = self.canvases.write();
        let stored = canvases
            .get_mut(&canvas.id())
            .ok_or(SketchError::CanvasNotFound { id: canvas.id() })?;

        let mut log: Vec<LogEntry> = stored.entries().to_vec();
        let before = log.len();
        for entry in canvas.entries() {
            let known = entry
                .task
                .id()
                .is_some_and(|id| stored.entry(id).is_some());
            if !known {
                log.push(entry.clone());
            }
        }
        log.sort_by_key(|entry| entry.sequence);
        let written = log.len() - before;

        *stored = Canvas::from_log(
            stored.id(),
            stored.height(),
            stored.width(),
            log,
            stored.created_at(),
        );
        tracing::debug!(canvas_id = %canvas.id(), written, "persisted canvas tasks");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> SketchResult<Canvas> {
        self.canvases
            .read()
            .get(&id)
            .cloned()
            .ok_or(SketchError::CanvasNotFound { id })
    }
}

// ---- InMemoryBackend: dumb KV store using DashMap ----

/// Thread-safe in-memory [`StorageBackend`] using [`DashMap`].
///
/// Contains no domain logic; see [`GenericCanvasStore`].
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: DashMap<String, Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, headers included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the backend holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.data
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put_if_absent(&self, key: &str, data: &[u8]) -> Result<bool, StorageError> {
        match self.data.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(data.to_vec());
                Ok(true)
            },
        }
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        Ok(self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }
}

/// Partitioned canvas store kept entirely in memory.
pub type PartitionedMemoryStore = GenericCanvasStore<InMemoryBackend>;
