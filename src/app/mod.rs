//! Application layer: commands, queries, and their handlers.
//!
//! Handlers depend only on [`CanvasRepository`]; they never touch storage
//! details. [`Application`] wires one of each handler over a shared
//! repository and lock registry.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use sketch::app::{Application, CreateCanvas, RetrieveCanvas};
//! use sketch::config::CanvasConfig;
//! use sketch::store::memory::InMemoryCanvasRepository;
//! use uuid::Uuid;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let app = Application::new(Arc::new(InMemoryCanvasRepository::new()), CanvasConfig::default());
//! let id = Uuid::new_v4();
//! app.create_canvas.handle(CreateCanvas { id }).await.unwrap();
//!
//! let canvas = app.retrieve_canvas.handle(RetrieveCanvas { id }).await.unwrap();
//! assert_eq!((canvas.height(), canvas.width()), (12, 32));
//! # });
//! ```

pub mod commands;
pub mod locks;
pub mod queries;

use std::sync::Arc;

pub use commands::{
    AddFill, AddFillHandler, CreateCanvas, CreateCanvasHandler, DrawRectangle,
    DrawRectangleHandler,
};
pub use locks::CanvasLocks;
pub use queries::{RetrieveCanvas, RetrieveCanvasHandler};

use crate::config::CanvasConfig;
use crate::store::CanvasRepository;

/// One handler per command and query, sharing a repository and locks.
#[derive(Clone)]
pub struct Application {
    /// Handles [`CreateCanvas`].
    pub create_canvas: CreateCanvasHandler,
    /// Handles [`DrawRectangle`].
    pub draw_rectangle: DrawRectangleHandler,
    /// Handles [`AddFill`].
    pub add_fill: AddFillHandler,
    /// Handles [`RetrieveCanvas`].
    pub retrieve_canvas: RetrieveCanvasHandler,
}

impl Application {
    /// Wires the handlers over `repository`. New canvases get `dimensions`.
    pub fn new(repository: Arc<dyn CanvasRepository>, dimensions: CanvasConfig) -> Self {
        let locks = CanvasLocks::new();
        Self {
            create_canvas: CreateCanvasHandler::new(Arc::clone(&repository), dimensions),
            draw_rectangle: DrawRectangleHandler::new(Arc::clone(&repository), locks.clone()),
            add_fill: AddFillHandler::new(Arc::clone(&repository), locks),
            retrieve_canvas: RetrieveCanvasHandler::new(repository),
        }
    }
}
