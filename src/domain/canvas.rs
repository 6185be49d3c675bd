//! The canvas aggregate.
//!
//! A [`Canvas`] has fixed dimensions and an append-only task log. Every
//! append validates the task against the dimensions first; a rejected task
//! leaves the log untouched.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use sketch::domain::{Canvas, Fill, Point, Rectangle};
//! use uuid::Uuid;
//!
//! let mut canvas = Canvas::new(Uuid::new_v4(), 9, 24, Utc::now());
//! let rectangle = Rectangle::new(Uuid::new_v4(), Point::new(3, 2), 3, 5, 'X', '@', Utc::now());
//! assert_eq!(canvas.add_rectangle(rectangle).unwrap(), 1);
//!
//! let fill = Fill::new(Uuid::new_v4(), Point::new(0, 0), '-', Utc::now());
//! assert_eq!(canvas.add_fill(fill).unwrap(), 2);
//! assert_eq!(canvas.tasks().count(), 2);
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::task::{Fill, LogEntry, Rectangle, Task};
use crate::error::{SketchError, SketchResult};

/// A fixed-size character canvas and its ordered task log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    id: Uuid,
    height: u32,
    width: u32,
    log: Vec<LogEntry>,
    created_at: DateTime<Utc>,
}

impl Canvas {
    /// Creates a canvas with an empty log.
    pub fn new(id: Uuid, height: u32, width: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            height,
            width,
            log: Vec::new(),
            created_at,
        }
    }

    /// Rebuilds a canvas from stored state.
    ///
    /// The log is taken as-is, in acceptance order, without re-validating
    /// containment; the renderer re-checks every task. Entries may include
    /// [`Task::Unrecognized`] records.
    pub fn from_log(
        id: Uuid,
        height: u32,
        width: u32,
        log: Vec<LogEntry>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            height,
            width,
            log,
            created_at,
        }
    }

    /// Canvas identity.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// When the canvas was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The task log in acceptance order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.log
    }

    /// The tasks in acceptance order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.log.iter().map(|entry| &entry.task)
    }

    /// Sequence number of the most recently accepted task, or 0 for an
    /// empty log.
    pub fn last_sequence(&self) -> u64 {
        self.log.iter().map(|entry| entry.sequence).max().unwrap_or(0)
    }

    /// Returns the log entry holding the task with the given id.
    pub fn entry(&self, task_id: Uuid) -> Option<&LogEntry> {
        self.log.iter().find(|entry| entry.task.id() == Some(task_id))
    }

    /// Appends a rectangle after checking
    /// `point.y + height <= canvas.height` and
    /// `point.x + width <= canvas.width`.
    ///
    /// Returns the sequence number of the accepted task. Re-submitting an
    /// id that is already in the log is a no-op that returns the original
    /// sequence number.
    ///
    /// # Errors
    ///
    /// - [`SketchError::OutOfBounds`] if the rectangle does not fit. The log
    ///   is unchanged.
    pub fn add_rectangle(&mut self, rectangle: Rectangle) -> SketchResult<u64> {
        if let Err(violation) = rectangle.check_within(self.height, self.width) {
            tracing::warn!(
                canvas_id = %self.id,
                task_id = %rectangle.id,
                %violation,
                "rejected rectangle"
            );
            return Err(SketchError::OutOfBounds(violation));
        }
        Ok(self.append(Task::Rectangle(rectangle)))
    }

    /// Appends a fill after checking `point.x <= canvas.width` and
    /// `point.y <= canvas.height`.
    ///
    /// The bound is inclusive: on a 30x30 canvas a fill seeded at (30, 30)
    /// is accepted. Same idempotency as [`add_rectangle`](Self::add_rectangle).
    ///
    /// # Errors
    ///
    /// - [`SketchError::OutOfBounds`] if the seed lies past the inclusive
    ///   bound. The log is unchanged.
    pub fn add_fill(&mut self, fill: Fill) -> SketchResult<u64> {
        if let Err(violation) = fill.check_within(self.height, self.width) {
            tracing::warn!(
                canvas_id = %self.id,
                task_id = %fill.id,
                %violation,
                "rejected fill"
            );
            return Err(SketchError::OutOfBounds(violation));
        }
        Ok(self.append(Task::Fill(fill)))
    }

    fn append(&mut self, task: Task) -> u64 {
        if let Some(existing) = task.id().and_then(|id| self.entry(id)) {
            tracing::debug!(
                canvas_id = %self.id,
                sequence = existing.sequence,
                "task already in log, ignoring resubmission"
            );
            return existing.sequence;
        }
        let sequence = self.last_sequence() + 1;
        tracing::debug!(
            canvas_id = %self.id,
            sequence,
            kind = task.kind_tag(),
            "accepted task"
        );
        self.log.push(LogEntry { sequence, task });
        sequence
    }
}
