//! Rendering engine: replays a canvas's task log into a character grid.
//!
//! Rendering is a pure function of the canvas state. Tasks are replayed
//! strictly in log order against a blank grid, and every task is
//! re-validated against the grid before it is painted, because the log may
//! come from a store the aggregate never checked. Any failure discards the
//! grid; callers never see a partially painted result.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use sketch::domain::{Canvas, Point, Rectangle};
//! use sketch::render::render;
//! use uuid::Uuid;
//!
//! let mut canvas = Canvas::new(Uuid::new_v4(), 3, 4, Utc::now());
//! canvas
//!     .add_rectangle(Rectangle::new(Uuid::new_v4(), Point::new(0, 0), 3, 4, '.', '#', Utc::now()))
//!     .unwrap();
//!
//! let grid = render(&canvas).unwrap();
//! assert_eq!(grid.to_string(), "####\n#..#\n####\n");
//! ```

mod flood;
mod grid;

pub use grid::{Grid, BLANK};

use tokio_util::sync::CancellationToken;

use crate::domain::{Canvas, Fill, Rectangle, Task};
use crate::error::{BoundsViolation, SketchError, SketchResult};

/// Turns a canvas into a grid.
///
/// This is the seam the HTTP layer depends on; [`AsciiRenderer`] is the
/// implementation that ships.
pub trait Renderer: Send + Sync {
    /// Renders the canvas, checking `cancel` between task-log entries.
    ///
    /// # Errors
    ///
    /// - [`SketchError::OutOfBounds`] for a zero-height canvas or a task
    ///   that does not fit the grid.
    /// - [`SketchError::InvalidTask`] for an unrecognized log entry.
    /// - [`SketchError::Cancelled`] if `cancel` fires mid-render.
    fn render_with_cancellation(
        &self,
        canvas: &Canvas,
        cancel: &CancellationToken,
    ) -> SketchResult<Grid>;

    /// Renders the canvas to completion.
    fn render(&self, canvas: &Canvas) -> SketchResult<Grid> {
        self.render_with_cancellation(canvas, &CancellationToken::new())
    }
}

/// Renders tasks as ASCII characters into a [`Grid`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiRenderer;

impl Renderer for AsciiRenderer {
    fn render_with_cancellation(
        &self,
        canvas: &Canvas,
        cancel: &CancellationToken,
    ) -> SketchResult<Grid> {
        render_with_cancellation(canvas, cancel)
    }
}

/// Renders the canvas to completion. See [`Renderer::render`].
pub fn render(canvas: &Canvas) -> SketchResult<Grid> {
    render_with_cancellation(canvas, &CancellationToken::new())
}

/// Renders the canvas, aborting with [`SketchError::Cancelled`] if `cancel`
/// fires between two task-log entries.
pub fn render_with_cancellation(canvas: &Canvas, cancel: &CancellationToken) -> SketchResult<Grid> {
    if canvas.height() == 0 {
        return Err(SketchError::OutOfBounds(BoundsViolation::DegenerateCanvas));
    }

    let mut grid = Grid::blank(canvas.height() as usize, canvas.width() as usize);
    for entry in canvas.entries() {
        if cancel.is_cancelled() {
            tracing::debug!(
                canvas_id = %canvas.id(),
                sequence = entry.sequence,
                "render cancelled"
            );
            return Err(SketchError::Cancelled);
        }
        match &entry.task {
            Task::Rectangle(rectangle) => draw_rectangle(&mut grid, canvas, rectangle)?,
            Task::Fill(fill) => apply_fill(&mut grid, canvas, fill)?,
            Task::Unrecognized(unknown) => {
                tracing::warn!(
                    canvas_id = %canvas.id(),
                    sequence = entry.sequence,
                    kind = %unknown.kind,
                    "unrecognized task in log"
                );
                return Err(SketchError::InvalidTask {
                    task_id: unknown.id,
                    kind: unknown.kind.clone(),
                });
            },
        }
    }
    Ok(grid)
}

fn draw_rectangle(grid: &mut Grid, canvas: &Canvas, rectangle: &Rectangle) -> SketchResult<()> {
    rectangle.check_within(canvas.height(), canvas.width())?;
    if rectangle.is_empty() {
        return Ok(());
    }

    let left = rectangle.point.x as usize;
    let top = rectangle.point.y as usize;
    let right = left + rectangle.width as usize - 1;
    let bottom = top + rectangle.height as usize - 1;

    for x in left..=right {
        grid.set(x, top, rectangle.outline);
        grid.set(x, bottom, rectangle.outline);
    }
    for y in top..=bottom {
        grid.set(left, y, rectangle.outline);
        grid.set(right, y, rectangle.outline);
    }
    for y in top + 1..bottom {
        for x in left + 1..right {
            grid.set(x, y, rectangle.filler);
        }
    }
    Ok(())
}

fn apply_fill(grid: &mut Grid, canvas: &Canvas, fill: &Fill) -> SketchResult<()> {
    // Strict here, inclusive in the aggregate.
    if fill.point.x >= canvas.width() || fill.point.y >= canvas.height() {
        return Err(SketchError::OutOfBounds(BoundsViolation::FillSeed {
            x: fill.point.x,
            y: fill.point.y,
            width: canvas.width(),
            height: canvas.height(),
        }));
    }
    flood::flood_fill(grid, fill.point.x as usize, fill.point.y as usize, fill.filler);
    Ok(())
}
