//! Character canvas service core.
//!
//! A canvas is a fixed-size grid of characters built up by an append-only
//! log of drawing tasks. Two task kinds exist: rectangles (outline plus
//! interior filler) and flood fills. The log is the source of truth; the
//! picture is derived from it by replaying every task in acceptance order.
//!
//! # Module Organization
//!
//! - [`domain`] - The canvas aggregate and the task types it logs
//! - [`render`] - Deterministic replay of a task log into a [`render::Grid`]
//! - [`store`] - Repository trait, in-memory and partitioned stores
//! - [`app`] - Command and query handlers with per-canvas serialization
//! - [`config`] - TOML and environment configuration
//! - [`error`] - Error types shared by every layer

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod store;

// Re-exports for ergonomic access
pub use domain::{Canvas, Fill, LogEntry, Point, Rectangle, Task, TaskKind};
pub use error::{BoundsViolation, SketchError, SketchResult};
