//! SQLite canvas repository.
//!
//! One table per task kind, each keyed by `(canvas_id, id)`. Every row
//! carries the `sequence` assigned when the task was accepted, and
//! [`merge_partitions`] restores acceptance order on load. Inserts use
//! `ON CONFLICT DO NOTHING`, so saving the same task twice leaves the first
//! row in place.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use uuid::Uuid;

use crate::domain::{Canvas, Fill, Point, Rectangle, Task};
use crate::error::{SketchError, SketchResult};
use crate::store::ordering::{merge_partitions, PartitionEntry};
use crate::store::CanvasRepository;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS canvases (
    id         TEXT PRIMARY KEY,
    height     INTEGER NOT NULL,
    width      INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS rectangles (
    id         TEXT NOT NULL,
    canvas_id  TEXT NOT NULL REFERENCES canvases (id),
    sequence   INTEGER,
    x          INTEGER NOT NULL,
    y          INTEGER NOT NULL,
    height     INTEGER NOT NULL,
    width      INTEGER NOT NULL,
    filler     TEXT NOT NULL,
    outline    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (canvas_id, id)
);
CREATE TABLE IF NOT EXISTS fills (
    id         TEXT NOT NULL,
    canvas_id  TEXT NOT NULL REFERENCES canvases (id),
    sequence   INTEGER,
    x          INTEGER NOT NULL,
    y          INTEGER NOT NULL,
    filler     TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (canvas_id, id)
);";

/// Canvas repository backed by a SQLite database.
///
/// Every query runs on tokio's blocking pool; the connection is shared with
/// those tasks behind a mutex.
pub struct SqliteCanvasRepository {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteCanvasRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCanvasRepository").finish_non_exhaustive()
    }
}

impl SqliteCanvasRepository {
    /// Opens (or creates) the database at `path` and applies the schema.
    ///
    /// # Errors
    ///
    /// - [`SketchError::Store`] if the file cannot be opened or the schema
    ///   cannot be created.
    pub fn open(path: impl AsRef<Path>) -> SketchResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| SketchError::Store(format!("failed to open {}: {e}", path.display())))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(db_err("WAL pragma failed"))?;
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// - [`SketchError::Store`] if the schema cannot be created.
    pub fn open_in_memory() -> SketchResult<Self> {
        let conn = Connection::open_in_memory().map_err(db_err("failed to open database"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> SketchResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(db_err("schema init failed"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> SketchResult<T>
    where
        F: FnOnce(&mut Connection) -> SketchResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || op(&mut conn.lock()))
            .await
            .map_err(|e| SketchError::Store(format!("database task failed: {e}")))?
    }
}

#[async_trait]
impl CanvasRepository for SqliteCanvasRepository {
    async fn insert(&self, canvas: &Canvas) -> SketchResult<()> {
        let canvas = canvas.clone();
        self.blocking(move |conn| insert_header(conn, &canvas)).await
    }

    async fn update(&self, canvas: &Canvas) -> SketchResult<()> {
        let canvas = canvas.clone();
        self.blocking(move |conn| persist_tasks(conn, &canvas)).await
    }

    async fn find_by_id(&self, id: Uuid) -> SketchResult<Canvas> {
        self.blocking(move |conn| load_canvas(conn, id)).await
    }
}

fn insert_header(conn: &Connection, canvas: &Canvas) -> SketchResult<()> {
    let inserted = conn
        .execute(
            "INSERT INTO canvases (id, height, width, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT DO NOTHING",
            params![
                canvas.id().to_string(),
                canvas.height(),
                canvas.width(),
                timestamp(canvas.created_at()),
            ],
        )
        .map_err(db_err("insert canvas failed"))?;
    tracing::debug!(canvas_id = %canvas.id(), inserted, "stored canvas header");
    Ok(())
}

fn persist_tasks(conn: &mut Connection, canvas: &Canvas) -> SketchResult<()> {
    let tx = conn
        .transaction()
        .map_err(db_err("transaction start failed"))?;
    let canvas_id = canvas.id().to_string();

    let exists = tx
        .query_row(
            "SELECT 1 FROM canvases WHERE id = ?1",
            params![canvas_id],
            |_| Ok(()),
        )
        .optional()
        .map_err(db_err("canvas lookup failed"))?
        .is_some();
    if !exists {
        return Err(SketchError::CanvasNotFound { id: canvas.id() });
    }

    let mut written = 0usize;
    for entry in canvas.entries() {
        let sequence = i64::try_from(entry.sequence)
            .map_err(|_| SketchError::Store(format!("sequence {} overflows", entry.sequence)))?;
        written += match &entry.task {
            Task::Rectangle(rectangle) => insert_rectangle(&tx, &canvas_id, sequence, rectangle)?,
            Task::Fill(fill) => insert_fill(&tx, &canvas_id, sequence, fill)?,
            // Dropping `tx` rolls back anything written so far.
            Task::Unrecognized(unknown) => {
                return Err(SketchError::InvalidTask {
                    task_id: unknown.id,
                    kind: unknown.kind.clone(),
                });
            },
        };
    }

    tx.commit()
        .map_err(db_err("transaction commit failed"))?;
    tracing::debug!(canvas_id = %canvas.id(), written, "persisted canvas tasks");
    Ok(())
}

fn load_canvas(conn: &Connection, id: Uuid) -> SketchResult<Canvas> {
    let canvas_id = id.to_string();

    let header = conn
        .query_row(
            "SELECT height, width, created_at FROM canvases WHERE id = ?1",
            params![canvas_id],
            |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .map_err(db_err("canvas lookup failed"))?;
    let Some((height, width, created_at)) = header else {
        return Err(SketchError::CanvasNotFound { id });
    };

    let rectangles = load_rectangles(conn, &canvas_id)?;
    let fills = load_fills(conn, &canvas_id)?;

    Ok(Canvas::from_log(
        id,
        height,
        width,
        merge_partitions(vec![rectangles, fills]),
        parse_timestamp(&created_at)?,
    ))
}

fn insert_rectangle(
    tx: &Transaction<'_>,
    canvas_id: &str,
    sequence: i64,
    rectangle: &Rectangle,
) -> SketchResult<usize> {
    tx.execute(
        "INSERT INTO rectangles
             (id, canvas_id, sequence, x, y, height, width, filler, outline, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT DO NOTHING",
        params![
            rectangle.id.to_string(),
            canvas_id,
            sequence,
            rectangle.point.x,
            rectangle.point.y,
            rectangle.height,
            rectangle.width,
            rectangle.filler.to_string(),
            rectangle.outline.to_string(),
            timestamp(rectangle.created_at),
        ],
    )
    .map_err(db_err("insert rectangle failed"))
}

fn insert_fill(
    tx: &Transaction<'_>,
    canvas_id: &str,
    sequence: i64,
    fill: &Fill,
) -> SketchResult<usize> {
    tx.execute(
        "INSERT INTO fills (id, canvas_id, sequence, x, y, filler, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT DO NOTHING",
        params![
            fill.id.to_string(),
            canvas_id,
            sequence,
            fill.point.x,
            fill.point.y,
            fill.filler.to_string(),
            timestamp(fill.created_at),
        ],
    )
    .map_err(db_err("insert fill failed"))
}

type RectangleRow = (String, Option<i64>, u32, u32, u32, u32, String, String, String);

fn load_rectangles(conn: &Connection, canvas_id: &str) -> SketchResult<Vec<PartitionEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, sequence, x, y, height, width, filler, outline, created_at
             FROM rectangles WHERE canvas_id = ?1",
        )
        .map_err(db_err("prepare rectangles query failed"))?;
    let rows = stmt
        .query_map(params![canvas_id], |row| -> rusqlite::Result<RectangleRow> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })
        .map_err(db_err("rectangles query failed"))?;

    rows.map(|row| {
        let (id, sequence, x, y, height, width, filler, outline, created_at) =
            row.map_err(db_err("rectangle row read failed"))?;
        let created_at = parse_timestamp(&created_at)?;
        Ok(PartitionEntry {
            sequence: parse_sequence(sequence)?,
            created_at: Some(created_at),
            task: Task::Rectangle(Rectangle::new(
                parse_id(&id)?,
                Point::new(x, y),
                height,
                width,
                parse_char(&filler)?,
                parse_char(&outline)?,
                created_at,
            )),
        })
    })
    .collect()
}

type FillRow = (String, Option<i64>, u32, u32, String, String);

fn load_fills(conn: &Connection, canvas_id: &str) -> SketchResult<Vec<PartitionEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, sequence, x, y, filler, created_at
             FROM fills WHERE canvas_id = ?1",
        )
        .map_err(db_err("prepare fills query failed"))?;
    let rows = stmt
        .query_map(params![canvas_id], |row| -> rusqlite::Result<FillRow> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })
        .map_err(db_err("fills query failed"))?;

    rows.map(|row| {
        let (id, sequence, x, y, filler, created_at) =
            row.map_err(db_err("fill row read failed"))?;
        let created_at = parse_timestamp(&created_at)?;
        Ok(PartitionEntry {
            sequence: parse_sequence(sequence)?,
            created_at: Some(created_at),
            task: Task::Fill(Fill::new(
                parse_id(&id)?,
                Point::new(x, y),
                parse_char(&filler)?,
                created_at,
            )),
        })
    })
    .collect()
}

fn db_err(context: &'static str) -> impl Fn(rusqlite::Error) -> SketchError {
    move |e| SketchError::Store(format!("{context}: {e}"))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> SketchResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| SketchError::Store(format!("bad timestamp {raw:?}: {e}")))
}

fn parse_id(raw: &str) -> SketchResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| SketchError::Store(format!("bad task id {raw:?}: {e}")))
}

fn parse_sequence(raw: Option<i64>) -> SketchResult<Option<u64>> {
    raw.map(|seq| {
        u64::try_from(seq).map_err(|_| SketchError::Store(format!("negative sequence {seq}")))
    })
    .transpose()
}

fn parse_char(raw: &str) -> SketchResult<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SketchError::Store(format!(
            "expected a single character, found {raw:?}"
        ))),
    }
}
