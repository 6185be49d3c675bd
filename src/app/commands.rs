//! Write-side commands and their handlers.
//!
//! Each mutating handler runs load, append and persist under the target
//! canvas's lock (see [`CanvasLocks`]), so appends to one canvas are
//! serialized and receive consecutive sequence numbers.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::app::locks::CanvasLocks;
use crate::config::CanvasConfig;
use crate::domain::{Canvas, Fill, Point, Rectangle};
use crate::error::SketchResult;
use crate::store::CanvasRepository;

/// Create an empty canvas with the configured dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateCanvas {
    /// Identity of the new canvas.
    pub id: Uuid,
}

/// Append a rectangle to a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRectangle {
    /// Target canvas.
    pub canvas_id: Uuid,
    /// Identity of the new task.
    pub task_id: Uuid,
    /// Top-left corner.
    pub point: Point,
    /// Rows.
    pub height: u32,
    /// Columns.
    pub width: u32,
    /// Interior character.
    pub filler: char,
    /// Border character.
    pub outline: char,
}

/// Append a flood fill to a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddFill {
    /// Target canvas.
    pub canvas_id: Uuid,
    /// Identity of the new task.
    pub task_id: Uuid,
    /// Seed cell.
    pub point: Point,
    /// Replacement character.
    pub filler: char,
}

/// Handles [`CreateCanvas`].
#[derive(Clone)]
pub struct CreateCanvasHandler {
    repository: Arc<dyn CanvasRepository>,
    dimensions: CanvasConfig,
}

impl CreateCanvasHandler {
    /// Creates a handler that gives new canvases `dimensions`.
    pub fn new(repository: Arc<dyn CanvasRepository>, dimensions: CanvasConfig) -> Self {
        Self {
            repository,
            dimensions,
        }
    }

    /// Persists a new empty canvas. Creating an id that already exists is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// - [`SketchError::Store`](crate::SketchError::Store) on storage
    ///   failures.
    pub async fn handle(&self, command: CreateCanvas) -> SketchResult<()> {
        let canvas = Canvas::new(
            command.id,
            self.dimensions.height,
            self.dimensions.width,
            Utc::now(),
        );
        self.repository.insert(&canvas).await?;
        tracing::info!(
            canvas_id = %command.id,
            height = self.dimensions.height,
            width = self.dimensions.width,
            "canvas created"
        );
        Ok(())
    }
}

/// Handles [`DrawRectangle`].
#[derive(Clone)]
pub struct DrawRectangleHandler {
    repository: Arc<dyn CanvasRepository>,
    locks: CanvasLocks,
}

impl DrawRectangleHandler {
    /// Creates a handler sharing `locks` with the other mutating handlers.
    pub fn new(repository: Arc<dyn CanvasRepository>, locks: CanvasLocks) -> Self {
        Self { repository, locks }
    }

    /// Appends the rectangle and persists it, returning its sequence number.
    ///
    /// # Errors
    ///
    /// - [`SketchError::CanvasNotFound`](crate::SketchError::CanvasNotFound)
    ///   if the canvas does not exist.
    /// - [`SketchError::OutOfBounds`](crate::SketchError::OutOfBounds) if the
    ///   rectangle does not fit. Nothing is persisted.
    /// - [`SketchError::Store`](crate::SketchError::Store) on storage
    ///   failures.
    pub async fn handle(&self, command: DrawRectangle) -> SketchResult<u64> {
        let _guard = self.locks.lock(command.canvas_id).await;
        let mut canvas = self.repository.find_by_id(command.canvas_id).await?;
        let sequence = canvas.add_rectangle(Rectangle::new(
            command.task_id,
            command.point,
            command.height,
            command.width,
            command.filler,
            command.outline,
            Utc::now(),
        ))?;
        self.repository.update(&canvas).await?;
        Ok(sequence)
    }
}

/// Handles [`AddFill`].
#[derive(Clone)]
pub struct AddFillHandler {
    repository: Arc<dyn CanvasRepository>,
    locks: CanvasLocks,
}

impl AddFillHandler {
    /// Creates a handler sharing `locks` with the other mutating handlers.
    pub fn new(repository: Arc<dyn CanvasRepository>, locks: CanvasLocks) -> Self {
        Self { repository, locks }
    }

    /// Appends the fill and persists it, returning its sequence number.
    ///
    /// # Errors
    ///
    /// Same as [`DrawRectangleHandler::handle`].
    pub async fn handle(&self, command: AddFill) -> SketchResult<u64> {
        let _guard = self.locks.lock(command.canvas_id).await;
        let mut canvas = self.repository.find_by_id(command.canvas_id).await?;
        let sequence = canvas.add_fill(Fill::new(
            command.task_id,
            command.point,
            command.filler,
            Utc::now(),
        ))?;
        self.repository.update(&canvas).await?;
        Ok(sequence)
    }
}
