//! Route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::de::DeserializeOwned;
use sketch::app::{CreateCanvas, RetrieveCanvas};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::ApiError;
use crate::requests::{
    CanvasSummary, CreateCanvasRequest, TaskAccepted, TaskCommand, TaskRequest,
};
use crate::AppState;

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid body: {e}")))
}

fn parse_canvas_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("invalid canvas id: {e}")))
}

/// `POST /canvas`: create an empty canvas.
pub async fn create_canvas(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: CreateCanvasRequest = parse_body(&body)?;
    state
        .app
        .create_canvas
        .handle(CreateCanvas { id: request.id })
        .await?;

    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let location = format!("http://{host}/canvas/{}", request.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)]).into_response())
}

/// `POST /canvas/{canvas_id}`: append a rectangle or a fill.
pub async fn add_task(
    State(state): State<Arc<AppState>>,
    Path(canvas_id): Path<String>,
    body: Bytes,
) -> Result<Json<TaskAccepted>, ApiError> {
    let canvas_id = parse_canvas_id(&canvas_id)?;
    let request: TaskRequest = parse_body(&body)?;
    let command = request
        .into_command(canvas_id)
        .map_err(ApiError::BadRequest)?;

    let sequence = match command {
        TaskCommand::Draw(draw) => state.app.draw_rectangle.handle(draw).await?,
        TaskCommand::Fill(fill) => state.app.add_fill.handle(fill).await?,
    };
    Ok(Json(TaskAccepted { sequence }))
}

/// `GET /canvas/{canvas_id}`: the rendered grid as plain text, or the canvas
/// summary when the client accepts JSON.
pub async fn render_canvas(
    State(state): State<Arc<AppState>>,
    Path(canvas_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let canvas_id = parse_canvas_id(&canvas_id)?;
    let canvas = state
        .app
        .retrieve_canvas
        .handle(RetrieveCanvas { id: canvas_id })
        .await?;

    let wants_json = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));
    if wants_json {
        return Ok(Json(CanvasSummary {
            id: canvas.id(),
            height: canvas.height(),
            width: canvas.width(),
            tasks: canvas.entries().len(),
        })
        .into_response());
    }

    // Dropping this future (client gone) drops the guard and cancels the
    // render between task-log entries.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let renderer = Arc::clone(&state.renderer);
    let grid = tokio::task::spawn_blocking(move || {
        renderer.render_with_cancellation(&canvas, &cancel)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task failed: {e}")))??;

    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        grid.to_string(),
    )
        .into_response())
}
