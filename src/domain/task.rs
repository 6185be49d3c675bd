//! Drawing tasks and shared geometry.
//!
//! A [`Task`] is either a bordered [`Rectangle`] or a flood [`Fill`]. The
//! third variant, [`Task::Unrecognized`], only appears when a log is loaded
//! from storage and one of its records carries a kind tag this crate does not
//! know; it is never accepted by the aggregate and always fails rendering.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::BoundsViolation;

/// A cell position: `x` is the column, `y` the row, both counted from the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Point {
    /// Creates a point at column `x`, row `y`.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A bordered rectangle whose top-left corner is `point`.
///
/// The border is painted with `outline` and the interior with `filler`.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use sketch::domain::{Point, Rectangle};
/// use uuid::Uuid;
///
/// let rectangle = Rectangle::new(Uuid::new_v4(), Point::new(3, 2), 3, 5, 'X', '@', Utc::now());
/// assert!(rectangle.check_within(9, 24).is_ok());
/// assert!(rectangle.check_within(4, 24).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rectangle {
    /// Task identity, unique within a canvas.
    pub id: Uuid,
    /// Top-left corner.
    pub point: Point,
    /// Number of rows.
    pub height: u32,
    /// Number of columns.
    pub width: u32,
    /// Interior character.
    pub filler: char,
    /// Border character.
    pub outline: char,
    /// When the task was submitted. Audit only, never an ordering key.
    pub created_at: DateTime<Utc>,
}

impl Rectangle {
    /// Creates a rectangle task.
    pub fn new(
        id: Uuid,
        point: Point,
        height: u32,
        width: u32,
        filler: char,
        outline: char,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            point,
            height,
            width,
            filler,
            outline,
            created_at,
        }
    }

    /// Checks `point.y + height <= height_limit` and
    /// `point.x + width <= width_limit`.
    ///
    /// Sums are computed in `u64` so no combination of `u32` inputs can
    /// wrap around and pass.
    pub fn check_within(&self, height_limit: u32, width_limit: u32) -> Result<(), BoundsViolation> {
        if u64::from(self.point.y) + u64::from(self.height) > u64::from(height_limit) {
            return Err(BoundsViolation::RectangleHeight {
                y: self.point.y,
                height: self.height,
                canvas_height: height_limit,
            });
        }
        if u64::from(self.point.x) + u64::from(self.width) > u64::from(width_limit) {
            return Err(BoundsViolation::RectangleWidth {
                x: self.point.x,
                width: self.width,
                canvas_width: width_limit,
            });
        }
        Ok(())
    }

    /// Returns `true` if the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }
}

/// A 4-connected flood fill seeded at `point`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    /// Task identity, unique within a canvas.
    pub id: Uuid,
    /// Seed cell.
    pub point: Point,
    /// Replacement character.
    pub filler: char,
    /// When the task was submitted. Audit only, never an ordering key.
    pub created_at: DateTime<Utc>,
}

impl Fill {
    /// Creates a fill task.
    pub fn new(id: Uuid, point: Point, filler: char, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            point,
            filler,
            created_at,
        }
    }

    /// Checks `point.x <= width_limit` and `point.y <= height_limit`.
    ///
    /// The bound is inclusive, unlike [`Rectangle::check_within`]. A seed on
    /// the row or column just past the canvas is accepted here and rejected
    /// later by the renderer.
    pub fn check_within(&self, height_limit: u32, width_limit: u32) -> Result<(), BoundsViolation> {
        if self.point.x > width_limit || self.point.y > height_limit {
            return Err(BoundsViolation::FillSeed {
                x: self.point.x,
                y: self.point.y,
                width: width_limit,
                height: height_limit,
            });
        }
        Ok(())
    }
}

/// A log record whose kind tag is not a known task variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedTask {
    /// Task identity, if the record carried a parseable one.
    pub id: Option<Uuid>,
    /// The kind tag found in the record.
    pub kind: String,
}

/// Physical partition a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    /// [`Task::Rectangle`]
    Rectangle,
    /// [`Task::Fill`]
    Fill,
}

impl TaskKind {
    /// All known kinds, in a fixed order.
    pub const ALL: [TaskKind; 2] = [TaskKind::Rectangle, TaskKind::Fill];

    /// Stable tag used in storage keys and records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Fill => "fill",
        }
    }

    /// Parses a stable tag back into a kind.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "rectangle" => Some(Self::Rectangle),
            "fill" => Some(Self::Fill),
            _ => None,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Bordered rectangle.
    Rectangle(Rectangle),
    /// Flood fill.
    Fill(Fill),
    /// Record loaded from storage with an unknown kind.
    Unrecognized(UnrecognizedTask),
}

impl Task {
    /// Task identity. `None` only for unrecognized records without an id.
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Rectangle(rectangle) => Some(rectangle.id),
            Self::Fill(fill) => Some(fill.id),
            Self::Unrecognized(unknown) => unknown.id,
        }
    }

    /// The partition this task is stored in, if it is a known variant.
    pub fn kind(&self) -> Option<TaskKind> {
        match self {
            Self::Rectangle(_) => Some(TaskKind::Rectangle),
            Self::Fill(_) => Some(TaskKind::Fill),
            Self::Unrecognized(_) => None,
        }
    }

    /// The kind tag, including the raw tag of unrecognized records.
    pub fn kind_tag(&self) -> &str {
        match self {
            Self::Rectangle(_) => TaskKind::Rectangle.as_str(),
            Self::Fill(_) => TaskKind::Fill.as_str(),
            Self::Unrecognized(unknown) => &unknown.kind,
        }
    }

    /// Submission timestamp of known variants.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Rectangle(rectangle) => Some(rectangle.created_at),
            Self::Fill(fill) => Some(fill.created_at),
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<Rectangle> for Task {
    fn from(rectangle: Rectangle) -> Self {
        Self::Rectangle(rectangle)
    }
}

impl From<Fill> for Task {
    fn from(fill: Fill) -> Self {
        Self::Fill(fill)
    }
}

/// A task together with its acceptance-order key.
///
/// `sequence` is assigned once, when the aggregate accepts the task, and is
/// strictly increasing within a canvas. It is the only key used to rebuild
/// the log from partitioned storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Per-canvas acceptance order, starting at 1.
    pub sequence: u64,
    /// The accepted task.
    pub task: Task,
}

impl LogEntry {
    /// Pairs a task with its sequence number.
    pub fn new(sequence: u64, task: impl Into<Task>) -> Self {
        Self {
            sequence,
            task: task.into(),
        }
    }
}
