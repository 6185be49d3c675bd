//! Low-level key-value storage backend trait and key helpers.
//!
//! The [`StorageBackend`] trait is the contract a raw storage engine
//! implements for the partitioned canvas store. It exposes three
//! operations: [`get`](StorageBackend::get),
//! [`put_if_absent`](StorageBackend::put_if_absent), and
//! [`list_by_prefix`](StorageBackend::list_by_prefix).
//!
//! Domain logic (containment, sequence assignment, partition merging,
//! serialization) does not belong here. Backends are dumb KV stores; the
//! domain logic lives in
//! [`GenericCanvasStore`](crate::store::generic::GenericCanvasStore).
//!
//! # Key Structure
//!
//! ```text
//! canvas/{canvas_id}                         header
//! canvas/{canvas_id}/tasks/{kind}/{task_id}  one task record
//! ```
//!
//! Every task kind occupies its own key range, which is what makes the
//! store partitioned. A canvas is loaded by listing
//! `canvas/{canvas_id}/tasks/` and merging the kinds found there.

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

/// Errors that can occur during raw storage operations.
///
/// `GenericCanvasStore` maps these to [`SketchError`](crate::SketchError)
/// variants before surfacing them to callers.
///
/// # Examples
///
/// ```
/// use sketch::store::backend::StorageError;
///
/// let err = StorageError::NotFound { key: "canvas/42".to_string() };
/// assert_eq!(err.to_string(), "key not found: canvas/42");
/// ```
#[derive(Debug)]
pub enum StorageError {
    /// The requested key was not found in storage.
    NotFound {
        /// The key that was not found.
        key: String,
    },

    /// An I/O or engine-specific error occurred.
    Backend {
        /// Human-readable description of the error.
        message: String,
        /// The underlying error, if available. Accessible via
        /// [`std::error::Error::source()`].
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { key } => write!(f, "key not found: {key}"),
            Self::Backend { message, .. } => write!(f, "backend error: {message}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend {
                source: Some(src), ..
            } => Some(src.as_ref()),
            _ => None,
        }
    }
}

/// Key-value storage backend for partitioned canvas persistence.
///
/// Records are opaque bytes. Backends must store and return keys verbatim
/// and must be `Send + Sync`, since handlers for different canvases call
/// into the same backend concurrently.
///
/// Writes are insert-only. A task record, once written, is never
/// overwritten; this is what lets concurrent or retried saves of the same
/// task converge on one row.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if no record exists for the key.
    /// - [`StorageError::Backend`] on engine failures.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Stores `data` under `key` unless the key already exists.
    ///
    /// Returns `true` if the record was written, `false` if the key was
    /// already taken (the existing record is left untouched).
    ///
    /// # Errors
    ///
    /// - [`StorageError::Backend`] on engine failures.
    async fn put_if_absent(&self, key: &str, data: &[u8]) -> Result<bool, StorageError>;

    /// Lists all records whose key starts with `prefix`, in no particular
    /// order.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Backend`] on engine failures.
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError>;
}

/// Key of a canvas header.
///
/// # Examples
///
/// ```
/// use sketch::store::backend::header_key;
/// use uuid::Uuid;
///
/// let id = Uuid::nil();
/// assert_eq!(header_key(id), "canvas/00000000-0000-0000-0000-000000000000");
/// ```
pub fn header_key(canvas_id: Uuid) -> String {
    format!("canvas/{canvas_id}")
}

/// Prefix under which every task of a canvas lives, across all kinds.
pub fn tasks_prefix(canvas_id: Uuid) -> String {
    format!("canvas/{canvas_id}/tasks/")
}

/// Key of one task record in the partition for `kind`.
///
/// # Examples
///
/// ```
/// use sketch::store::backend::{task_key, tasks_prefix};
/// use uuid::Uuid;
///
/// let key = task_key(Uuid::nil(), "fill", Uuid::nil());
/// assert!(key.starts_with(&tasks_prefix(Uuid::nil())));
/// assert!(key.contains("/fill/"));
/// ```
pub fn task_key(canvas_id: Uuid, kind: &str, task_id: Uuid) -> String {
    format!("{}{kind}/{task_id}", tasks_prefix(canvas_id))
}

/// Splits a task key into `(kind, task_id)`.
///
/// Returns `None` if the key is not under `canvas/{canvas_id}/tasks/` or has
/// no kind segment.
pub fn parse_task_key(canvas_id: Uuid, key: &str) -> Option<(&str, &str)> {
    key.strip_prefix(tasks_prefix(canvas_id).as_str())?
        .split_once('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_display_backend() {
        let err = StorageError::Backend {
            message: "disk full".to_string(),
            source: None,
        };
        assert_eq!(err.to_string(), "backend error: disk full");
    }

    #[test]
    fn storage_error_source_is_preserved() {
        use std::error::Error;

        let io = std::io::Error::other("boom");
        let err = StorageError::Backend {
            message: "write failed".to_string(),
            source: Some(Box::new(io)),
        };
        assert!(err.source().is_some());

        let not_found = StorageError::NotFound {
            key: "k".to_string(),
        };
        assert!(not_found.source().is_none());
    }

    #[test]
    fn task_keys_round_trip() {
        let canvas_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let key = task_key(canvas_id, "rectangle", task_id);
        let task_id_str = task_id.to_string();
        assert_eq!(
            parse_task_key(canvas_id, &key),
            Some(("rectangle", task_id_str.as_str()))
        );
    }

    #[test]
    fn task_key_of_another_canvas_does_not_parse() {
        let key = task_key(Uuid::new_v4(), "fill", Uuid::new_v4());
        assert_eq!(parse_task_key(Uuid::new_v4(), &key), None);
    }

    #[test]
    fn header_key_is_outside_the_tasks_prefix() {
        let id = Uuid::new_v4();
        assert!(!header_key(id).starts_with(&tasks_prefix(id)));
    }
}
