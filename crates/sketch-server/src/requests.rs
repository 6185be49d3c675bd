//! Request bodies and their validation.

use serde::{Deserialize, Serialize};
use sketch::app::{AddFill, DrawRectangle};
use sketch::render::BLANK;
use sketch::Point;
use uuid::Uuid;

/// Body of `POST /canvas`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCanvasRequest {
    /// Identity of the new canvas.
    pub id: Uuid,
}

/// A cell position on the wire.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointRequest {
    pub x: u32,
    pub y: u32,
}

impl From<PointRequest> for Point {
    fn from(point: PointRequest) -> Self {
        Point::new(point.x, point.y)
    }
}

/// Rectangle payload of a task request.
#[derive(Debug, Clone, Deserialize)]
pub struct DrawRectangleRequest {
    pub id: Uuid,
    pub point: PointRequest,
    pub height: u32,
    pub width: u32,
    #[serde(default)]
    pub filler: Option<String>,
    #[serde(default)]
    pub outline: Option<String>,
}

/// Fill payload of a task request.
#[derive(Debug, Clone, Deserialize)]
pub struct AddFillRequest {
    pub id: Uuid,
    pub point: PointRequest,
    pub filler: String,
}

/// Body of `POST /canvas/{canvas_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    /// `"draw_rectangle"` or `"add_fill"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub rectangle: Option<DrawRectangleRequest>,
    #[serde(default)]
    pub fill: Option<AddFillRequest>,
}

/// A validated task request, ready for its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCommand {
    Draw(DrawRectangle),
    Fill(AddFill),
}

impl TaskRequest {
    /// Validates the request and builds the command for `canvas_id`.
    ///
    /// A rectangle needs at least one of `filler` and `outline`. A missing
    /// filler is blank; a missing outline takes the filler.
    pub fn into_command(self, canvas_id: Uuid) -> Result<TaskCommand, String> {
        match self.kind.as_str() {
            "draw_rectangle" => {
                let rectangle = self
                    .rectangle
                    .ok_or("rectangle attribute must be present in task \"draw_rectangle\"")?;
                let (filler, outline) = match (&rectangle.filler, &rectangle.outline) {
                    (None, None) => {
                        return Err("one of filler and outline must be present".to_string())
                    },
                    (filler, outline) => {
                        let filler = filler
                            .as_deref()
                            .map(|f| single_char("filler", f))
                            .transpose()?
                            .unwrap_or(BLANK);
                        let outline = outline
                            .as_deref()
                            .map(|o| single_char("outline", o))
                            .transpose()?
                            .unwrap_or(filler);
                        (filler, outline)
                    },
                };
                Ok(TaskCommand::Draw(DrawRectangle {
                    canvas_id,
                    task_id: rectangle.id,
                    point: rectangle.point.into(),
                    height: rectangle.height,
                    width: rectangle.width,
                    filler,
                    outline,
                }))
            },
            "add_fill" => {
                let fill = self
                    .fill
                    .ok_or("fill attribute must be present in task \"add_fill\"")?;
                Ok(TaskCommand::Fill(AddFill {
                    canvas_id,
                    task_id: fill.id,
                    point: fill.point.into(),
                    filler: single_char("filler", &fill.filler)?,
                }))
            },
            other => Err(format!("unsupported operation {other:?}")),
        }
    }
}

fn single_char(field: &str, value: &str) -> Result<char, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("{field} must be a single character")),
    }
}

/// Response of `POST /canvas/{canvas_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskAccepted {
    /// Position of the task in the canvas log.
    pub sequence: u64,
}

/// JSON view of `GET /canvas/{canvas_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasSummary {
    pub id: Uuid,
    pub height: u32,
    pub width: u32,
    /// Number of tasks in the log.
    pub tasks: usize,
}
