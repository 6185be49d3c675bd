//! Error types for canvas operations.
//!
//! Provides [`SketchError`], the error taxonomy shared by the aggregate, the
//! rendering engine and the repositories, and [`BoundsViolation`], which
//! names the containment rule a task broke.

use thiserror::Error;
use uuid::Uuid;

/// Convenience result type used across the crate.
pub type SketchResult<T> = Result<T, SketchError>;

/// The containment rule a task failed.
///
/// Carried by [`SketchError::OutOfBounds`] so callers can tell which edge
/// of the canvas was crossed without parsing the message.
///
/// # Examples
///
/// ```
/// use sketch::BoundsViolation;
///
/// let violation = BoundsViolation::RectangleHeight {
///     y: 2,
///     height: 10,
///     canvas_height: 9,
/// };
/// assert!(violation.to_string().contains("9"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundsViolation {
    /// `point.y + height` exceeds the canvas height.
    #[error("rectangle at row {y} with height {height} exceeds canvas height {canvas_height}")]
    RectangleHeight {
        /// Top row of the rectangle.
        y: u32,
        /// Rectangle height.
        height: u32,
        /// Canvas height.
        canvas_height: u32,
    },

    /// `point.x + width` exceeds the canvas width.
    #[error("rectangle at column {x} with width {width} exceeds canvas width {canvas_width}")]
    RectangleWidth {
        /// Left column of the rectangle.
        x: u32,
        /// Rectangle width.
        width: u32,
        /// Canvas width.
        canvas_width: u32,
    },

    /// The fill seed lies outside the accepted area.
    #[error("fill seed ({x}, {y}) lies outside a {width}x{height} area")]
    FillSeed {
        /// Seed column.
        x: u32,
        /// Seed row.
        y: u32,
        /// Width the seed was checked against.
        width: u32,
        /// Height the seed was checked against.
        height: u32,
    },

    /// The canvas has no rows, so there is nothing to render into.
    #[error("canvas has zero height")]
    DegenerateCanvas,
}

/// Errors that can occur while mutating, rendering or persisting a canvas.
///
/// # Examples
///
/// ```
/// use sketch::SketchError;
/// use uuid::Uuid;
///
/// let id = Uuid::nil();
/// let err = SketchError::CanvasNotFound { id };
/// assert!(err.to_string().contains(&id.to_string()));
/// assert!(err.is_recoverable());
///
/// let err = SketchError::Store("disk full".to_string());
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum SketchError {
    /// A task's footprint does not fit the canvas.
    #[error("task out of bounds: {0}")]
    OutOfBounds(BoundsViolation),

    /// The referenced canvas is unknown to the store.
    #[error("canvas {id} not found")]
    CanvasNotFound {
        /// The canvas ID that was not found.
        id: Uuid,
    },

    /// A log entry is not a recognized task variant.
    #[error("invalid task of kind {kind:?} (id: {task_id:?})")]
    InvalidTask {
        /// The task ID, if the record carried one.
        task_id: Option<Uuid>,
        /// The kind tag found in the record.
        kind: String,
    },

    /// Rendering was aborted by the caller's cancellation signal.
    #[error("rendering cancelled")]
    Cancelled,

    /// Lower-level storage failure, propagated opaquely.
    #[error("store error: {0}")]
    Store(String),
}

impl SketchError {
    /// Returns `true` for errors the caller can act on by correcting its
    /// request (geometry or canvas id). Integrity and storage failures are
    /// never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfBounds(_) | Self::CanvasNotFound { .. })
    }
}

impl From<BoundsViolation> for SketchError {
    fn from(violation: BoundsViolation) -> Self {
        Self::OutOfBounds(violation)
    }
}
