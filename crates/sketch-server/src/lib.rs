//! HTTP server for the sketch canvas service.
//!
//! # Routes
//!
//! | Method | Path                   | Effect                                   |
//! |--------|------------------------|------------------------------------------|
//! | POST   | `/canvas`              | create a canvas, 201 with `Location`     |
//! | POST   | `/canvas/{canvas_id}`  | append a rectangle or fill               |
//! | GET    | `/canvas/{canvas_id}`  | rendered grid (`text/plain`) or summary  |

pub mod error;
pub mod handlers;
pub mod requests;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use sketch::app::Application;
use sketch::config::SketchConfig;
use sketch::render::{AsciiRenderer, Renderer};
use sketch::store::{open_repository, CanvasRepository};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub app: Application,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// State over `repository` with the ASCII renderer.
    pub fn new(repository: Arc<dyn CanvasRepository>, config: &SketchConfig) -> Self {
        Self {
            app: Application::new(repository, config.canvas),
            renderer: Arc::new(AsciiRenderer),
        }
    }
}

/// Builds the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/canvas", post(handlers::create_canvas))
        .route(
            "/canvas/{canvas_id}",
            get(handlers::render_canvas).post(handlers::add_task),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Opens the configured store and serves until Ctrl+C.
pub async fn serve(config: SketchConfig) -> Result<()> {
    let repository =
        open_repository(&config.store).context("failed to open canvas repository")?;
    let state = Arc::new(AppState::new(repository, &config));
    let app = router(state);

    let addr = config.http.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        addr = %addr,
        store = ?config.store.backend,
        height = config.canvas.height,
        width = config.canvas.width,
        "sketch server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("sketch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
