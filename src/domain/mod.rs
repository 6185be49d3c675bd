//! Domain types for canvases and their drawing tasks.
//!
//! [`Canvas`] is the aggregate: it owns fixed dimensions and an append-only
//! log of [`LogEntry`] values, and enforces containment before any task is
//! accepted. [`Task`] is the closed set of drawing operations.

pub mod canvas;
pub mod task;

pub use canvas::*;
pub use task::*;
