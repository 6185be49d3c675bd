//! Storage records -- the persisted form of canvas headers and tasks.
//!
//! Records separate storage concerns from the domain model. A
//! [`TaskRecord`] carries the per-canvas `sequence` assigned at accept time
//! and a `kind` tag that selects its partition. Decoding is lenient about the
//! tag: a record whose kind is unknown decodes to
//! [`Task::Unrecognized`] instead of failing the whole load, so the
//! integrity failure surfaces at render time with the offending id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Canvas, Fill, LogEntry, Point, Rectangle, Task, TaskKind, UnrecognizedTask};
use crate::error::{SketchError, SketchResult};
use crate::store::ordering::PartitionEntry;

/// Persisted canvas header: identity and fixed geometry, no tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasHeader {
    /// Canvas identity.
    pub id: Uuid,
    /// Number of rows.
    pub height: u32,
    /// Number of columns.
    pub width: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&Canvas> for CanvasHeader {
    fn from(canvas: &Canvas) -> Self {
        Self {
            id: canvas.id(),
            height: canvas.height(),
            width: canvas.width(),
            created_at: canvas.created_at(),
        }
    }
}

/// Kind-specific task payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskBody {
    /// Payload of [`Task::Rectangle`].
    Rectangle {
        /// Left column.
        x: u32,
        /// Top row.
        y: u32,
        /// Rows.
        height: u32,
        /// Columns.
        width: u32,
        /// Interior character.
        filler: char,
        /// Border character.
        outline: char,
    },
    /// Payload of [`Task::Fill`].
    Fill {
        /// Seed column.
        x: u32,
        /// Seed row.
        y: u32,
        /// Replacement character.
        filler: char,
    },
}

impl TaskBody {
    /// The partition this payload belongs to.
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Rectangle { .. } => TaskKind::Rectangle,
            Self::Fill { .. } => TaskKind::Fill,
        }
    }
}

/// Persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task identity; the deduplication key within a canvas.
    pub id: Uuid,
    /// Owning canvas.
    pub canvas_id: Uuid,
    /// Acceptance order. `None` only in records written before sequence
    /// numbers existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    /// Submission time, kept for auditing.
    pub created_at: DateTime<Utc>,
    /// Kind tag and payload.
    #[serde(flatten)]
    pub body: TaskBody,
}

impl TaskRecord {
    /// Builds the record for a log entry.
    ///
    /// # Errors
    ///
    /// - [`SketchError::InvalidTask`] for [`Task::Unrecognized`] entries;
    ///   stores never write a task the aggregate could not have accepted.
    pub fn from_entry(canvas_id: Uuid, entry: &LogEntry) -> SketchResult<Self> {
        match &entry.task {
            Task::Rectangle(rectangle) => Ok(Self {
                id: rectangle.id,
                canvas_id,
                sequence: Some(entry.sequence),
                created_at: rectangle.created_at,
                body: TaskBody::Rectangle {
                    x: rectangle.point.x,
                    y: rectangle.point.y,
                    height: rectangle.height,
                    width: rectangle.width,
                    filler: rectangle.filler,
                    outline: rectangle.outline,
                },
            }),
            Task::Fill(fill) => Ok(Self {
                id: fill.id,
                canvas_id,
                sequence: Some(entry.sequence),
                created_at: fill.created_at,
                body: TaskBody::Fill {
                    x: fill.point.x,
                    y: fill.point.y,
                    filler: fill.filler,
                },
            }),
            Task::Unrecognized(unknown) => Err(SketchError::InvalidTask {
                task_id: unknown.id,
                kind: unknown.kind.clone(),
            }),
        }
    }

    /// Converts the record back into a domain task.
    pub fn into_task(self) -> Task {
        match self.body {
            TaskBody::Rectangle {
                x,
                y,
                height,
                width,
                filler,
                outline,
            } => Task::Rectangle(Rectangle::new(
                self.id,
                Point::new(x, y),
                height,
                width,
                filler,
                outline,
                self.created_at,
            )),
            TaskBody::Fill { x, y, filler } => {
                Task::Fill(Fill::new(self.id, Point::new(x, y), filler, self.created_at))
            },
        }
    }

    /// The record paired with its ordering fields.
    pub fn into_partition_entry(self) -> PartitionEntry {
        PartitionEntry {
            sequence: self.sequence,
            created_at: Some(self.created_at),
            task: self.into_task(),
        }
    }
}

/// Serializes a value to canonical JSON bytes.
pub(crate) fn encode<T: Serialize>(value: &T, what: &str) -> SketchResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| SketchError::Store(format!("failed to serialize {what}: {e}")))
}

/// Deserializes a canvas header.
pub(crate) fn decode_header(data: &[u8]) -> SketchResult<CanvasHeader> {
    serde_json::from_slice(data)
        .map_err(|e| SketchError::Store(format!("failed to deserialize canvas header: {e}")))
}

/// Deserializes a task record, turning unknown kinds into
/// [`Task::Unrecognized`].
///
/// # Errors
///
/// - [`SketchError::Store`] if the bytes are not a JSON object, or the kind
///   is known but the payload is malformed.
pub(crate) fn decode_task(data: &[u8]) -> SketchResult<PartitionEntry> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| SketchError::Store(format!("failed to deserialize task record: {e}")))?;
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if TaskKind::parse(&kind).is_some() {
        let record: TaskRecord = serde_json::from_value(value)
            .map_err(|e| SketchError::Store(format!("malformed {kind} record: {e}")))?;
        return Ok(record.into_partition_entry());
    }

    let id = value
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok());
    let sequence = value.get("sequence").and_then(Value::as_u64);
    let created_at = value
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc));
    tracing::warn!(kind = %kind, task_id = ?id, "decoded task record with unknown kind");

    Ok(PartitionEntry {
        sequence,
        created_at,
        task: Task::Unrecognized(UnrecognizedTask { id, kind }),
    })
}
