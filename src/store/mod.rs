//! Canvas repository trait and its implementations.
//!
//! # Architecture
//!
//! 1. **[`CanvasRepository`]** -- The persistence seam, used as
//!    `Arc<dyn CanvasRepository>` by the command and query handlers.
//!
//! 2. **[`GenericCanvasStore<B>`](generic::GenericCanvasStore)** -- The
//!    partitioned store: each task kind is written to its own key range and
//!    the ranges are merged back into acceptance order on load (see
//!    [`ordering`]).
//!
//! 3. **[`StorageBackend`]** -- Dumb KV trait under the generic store.
//!
//! # Implementations
//!
//! - [`InMemoryCanvasRepository`](memory::InMemoryCanvasRepository) -- arena
//!   of whole canvases behind one read/write lock.
//! - [`PartitionedMemoryStore`](memory::PartitionedMemoryStore) -- the
//!   generic store over [`InMemoryBackend`](memory::InMemoryBackend).
//! - `SqliteCanvasRepository` -- one table per task kind. Available behind
//!   the `sqlite` feature flag.
//!
//! # Contract
//!
//! - `insert` persists the canvas header only. Inserting an id that already
//!   exists is a silent no-op.
//! - `update` persists the tasks not yet stored. Tasks already stored under
//!   the same id are left alone, so saving the same canvas twice is a no-op.
//! - `find_by_id` returns the canvas with its tasks in acceptance order.
//!   A missing canvas is [`SketchError::CanvasNotFound`].

pub mod backend;
pub mod generic;
pub mod memory;
pub mod ordering;
pub mod record;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

pub use backend::{StorageBackend, StorageError};

use crate::config::{StoreBackendKind, StoreConfig};
use crate::domain::Canvas;
use crate::error::{SketchError, SketchResult};

/// Persistence for canvases and their task logs.
#[async_trait]
pub trait CanvasRepository: Send + Sync {
    /// Stores a new canvas header.
    ///
    /// # Errors
    ///
    /// - [`SketchError::Store`] on storage failures.
    async fn insert(&self, canvas: &Canvas) -> SketchResult<()>;

    /// Stores every task in `canvas` that is not stored yet.
    ///
    /// # Errors
    ///
    /// - [`SketchError::CanvasNotFound`] if the canvas was never inserted.
    /// - [`SketchError::InvalidTask`] if the log holds an unrecognized task.
    /// - [`SketchError::Store`] on storage failures.
    async fn update(&self, canvas: &Canvas) -> SketchResult<()>;

    /// Loads a canvas with its full task log.
    ///
    /// # Errors
    ///
    /// - [`SketchError::CanvasNotFound`] if no canvas has this id.
    /// - [`SketchError::Store`] on storage or decoding failures.
    async fn find_by_id(&self, id: Uuid) -> SketchResult<Canvas>;
}

/// Opens the repository selected by `config`.
///
/// # Errors
///
/// - [`SketchError::Store`] if the SQLite database cannot be opened, or if
///   SQLite was selected in a build without the `sqlite` feature.
pub fn open_repository(config: &StoreConfig) -> SketchResult<Arc<dyn CanvasRepository>> {
    match config.backend {
        StoreBackendKind::Memory => Ok(Arc::new(memory::InMemoryCanvasRepository::new())),
        StoreBackendKind::Partitioned => Ok(Arc::new(memory::PartitionedMemoryStore::new(
            memory::InMemoryBackend::new(),
        ))),
        StoreBackendKind::Sqlite => open_sqlite(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &StoreConfig) -> SketchResult<Arc<dyn CanvasRepository>> {
    let repository = match &config.path {
        Some(path) => sqlite::SqliteCanvasRepository::open(path)?,
        None => sqlite::SqliteCanvasRepository::open_in_memory()?,
    };
    Ok(Arc::new(repository))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &StoreConfig) -> SketchResult<Arc<dyn CanvasRepository>> {
    Err(SketchError::Store(
        "sqlite store requested but the `sqlite` feature is not enabled".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn open_memory_repository() {
        let repository = open_repository(&StoreConfig::default()).unwrap();
        let canvas = Canvas::new(Uuid::new_v4(), 2, 2, Utc::now());
        repository.insert(&canvas).await.unwrap();
        assert_eq!(repository.find_by_id(canvas.id()).await.unwrap().id(), canvas.id());
    }

    #[tokio::test]
    async fn open_partitioned_repository() {
        let config = StoreConfig {
            backend: StoreBackendKind::Partitioned,
            path: None,
        };
        let repository = open_repository(&config).unwrap();
        let id = Uuid::new_v4();
        assert!(matches!(
            repository.find_by_id(id).await,
            Err(SketchError::CanvasNotFound { .. })
        ));
    }

    #[cfg(not(feature = "sqlite"))]
    #[test]
    fn sqlite_without_feature_is_an_error() {
        let config = StoreConfig {
            backend: StoreBackendKind::Sqlite,
            path: None,
        };
        assert!(matches!(open_repository(&config), Err(SketchError::Store(_))));
    }
}
