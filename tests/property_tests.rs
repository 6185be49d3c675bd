//! Property-based tests using proptest.
//!
//! Covers the acceptance rule for each task kind, render determinism, and
//! the promise that a partitioned store hands back the log it was given.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use sketch::domain::{Canvas, Fill, Point, Rectangle};
use sketch::render::render;
use sketch::store::memory::{InMemoryBackend, PartitionedMemoryStore};
use sketch::store::ordering::{merge_partitions, PartitionEntry};
use sketch::store::CanvasRepository;

// ─── Arbitrary Strategies ───────────────────────────────────────────────────

const STYLE: &str = "[ -~]";

fn arb_style() -> impl Strategy<Value = char> {
    STYLE.prop_map(|s| s.chars().next().unwrap_or(' '))
}

fn arb_time() -> impl Strategy<Value = DateTime<Utc>> {
    // A narrow window so equal timestamps turn up often.
    (0i64..8).prop_map(|offset| Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap())
}

/// A drawing operation that is always accepted and always renders.
#[derive(Debug, Clone)]
enum Op {
    Rect {
        x: u32,
        y: u32,
        height: u32,
        width: u32,
        filler: char,
        outline: char,
    },
    Fill {
        x: u32,
        y: u32,
        filler: char,
    },
}

fn arb_op(height: u32, width: u32) -> impl Strategy<Value = Op> {
    let rect = (0..=width, 0..=height, arb_style(), arb_style())
        .prop_flat_map(move |(x, y, filler, outline)| {
            (0..=height - y, 0..=width - x).prop_map(move |(h, w)| Op::Rect {
                x,
                y,
                height: h,
                width: w,
                filler,
                outline,
            })
        });
    let fill = (0..width, 0..height, arb_style()).prop_map(|(x, y, filler)| Op::Fill { x, y, filler });
    prop_oneof![rect, fill]
}

fn arb_drawing() -> impl Strategy<Value = (u32, u32, Vec<Op>)> {
    (1u32..16, 1u32..24).prop_flat_map(|(height, width)| {
        (
            Just(height),
            Just(width),
            prop::collection::vec(arb_op(height, width), 0..12),
        )
    })
}

fn apply(canvas: &mut Canvas, op: &Op, created_at: DateTime<Utc>) {
    let result = match *op {
        Op::Rect {
            x,
            y,
            height,
            width,
            filler,
            outline,
        } => canvas.add_rectangle(Rectangle::new(
            Uuid::new_v4(),
            Point::new(x, y),
            height,
            width,
            filler,
            outline,
            created_at,
        )),
        Op::Fill { x, y, filler } => {
            canvas.add_fill(Fill::new(Uuid::new_v4(), Point::new(x, y), filler, created_at))
        },
    };
    assert!(result.is_ok(), "{op:?} should be accepted: {result:?}");
}

fn drawing(height: u32, width: u32, ops: &[Op], created_at: DateTime<Utc>) -> Canvas {
    let mut canvas = Canvas::new(Uuid::new_v4(), height, width, created_at);
    for op in ops {
        apply(&mut canvas, op, created_at);
    }
    canvas
}

// ─── Property Tests: Acceptance ─────────────────────────────────────────────

proptest! {
    /// A rectangle is accepted exactly when it fits inside the canvas.
    #[test]
    fn rectangle_accepted_iff_contained(
        canvas_height in 0u32..40,
        canvas_width in 0u32..40,
        x in 0u32..50,
        y in 0u32..50,
        height in 0u32..50,
        width in 0u32..50,
    ) {
        let mut canvas = Canvas::new(Uuid::new_v4(), canvas_height, canvas_width, Utc::now());
        let result = canvas.add_rectangle(Rectangle::new(
            Uuid::new_v4(), Point::new(x, y), height, width, 'x', 'o', Utc::now(),
        ));
        let fits = y + height <= canvas_height && x + width <= canvas_width;
        prop_assert_eq!(result.is_ok(), fits);
        prop_assert_eq!(canvas.entries().len(), usize::from(fits));
    }

    /// Huge coordinates never wrap around into acceptance.
    #[test]
    fn rectangle_bounds_do_not_overflow(
        x in (u32::MAX - 8)..=u32::MAX,
        width in 1u32..16,
    ) {
        let mut canvas = Canvas::new(Uuid::new_v4(), 10, 10, Utc::now());
        let result = canvas.add_rectangle(Rectangle::new(
            Uuid::new_v4(), Point::new(x, 0), 1, width, 'x', 'o', Utc::now(),
        ));
        prop_assert!(result.is_err());
    }

    /// A fill seed is accepted on or inside the inclusive bound.
    #[test]
    fn fill_accepted_iff_within_inclusive_bound(
        canvas_height in 0u32..40,
        canvas_width in 0u32..40,
        x in 0u32..50,
        y in 0u32..50,
    ) {
        let mut canvas = Canvas::new(Uuid::new_v4(), canvas_height, canvas_width, Utc::now());
        let result = canvas.add_fill(Fill::new(Uuid::new_v4(), Point::new(x, y), '-', Utc::now()));
        prop_assert_eq!(result.is_ok(), x <= canvas_width && y <= canvas_height);
    }

    /// A rejected task leaves the log and the rendering untouched.
    #[test]
    fn rejection_leaves_canvas_unchanged((height, width, ops) in arb_drawing(), overshoot in 1u32..10) {
        let mut canvas = drawing(height, width, &ops, Utc::now());
        let before = canvas.clone();
        let grid = render(&canvas).unwrap();

        let result = canvas.add_rectangle(Rectangle::new(
            Uuid::new_v4(), Point::new(0, 0), height + overshoot, 1, 'z', 'z', Utc::now(),
        ));
        prop_assert!(result.is_err());
        prop_assert_eq!(&canvas, &before);
        prop_assert_eq!(render(&canvas).unwrap(), grid);
    }

    /// Accepted tasks get consecutive sequence numbers starting at 1.
    #[test]
    fn sequences_are_consecutive((height, width, ops) in arb_drawing()) {
        let canvas = drawing(height, width, &ops, Utc::now());
        let sequences: Vec<u64> = canvas.entries().iter().map(|e| e.sequence).collect();
        let expected: Vec<u64> = (1..=ops.len() as u64).collect();
        prop_assert_eq!(sequences, expected);
    }
}

// ─── Property Tests: Rendering ──────────────────────────────────────────────

proptest! {
    /// Rendering the same log twice gives the same grid.
    #[test]
    fn render_is_deterministic((height, width, ops) in arb_drawing()) {
        let canvas = drawing(height, width, &ops, Utc::now());
        prop_assert_eq!(render(&canvas).unwrap(), render(&canvas).unwrap());
    }

    /// The grid always has the canvas dimensions.
    #[test]
    fn render_matches_canvas_shape((height, width, ops) in arb_drawing()) {
        let canvas = drawing(height, width, &ops, Utc::now());
        let grid = render(&canvas).unwrap();
        prop_assert_eq!(grid.height(), height as usize);
        prop_assert_eq!(grid.width(), width as usize);
    }

    /// A full-canvas rectangle drawn last hides everything before it.
    #[test]
    fn covering_rectangle_hides_history((height, width, ops) in arb_drawing(), style in arb_style()) {
        let mut canvas = drawing(height, width, &ops, Utc::now());
        canvas.add_rectangle(Rectangle::new(
            Uuid::new_v4(), Point::new(0, 0), height, width, style, style, Utc::now(),
        )).unwrap();
        let grid = render(&canvas).unwrap();
        prop_assert!(grid.rows().all(|row| row.iter().all(|&c| c == style)));
    }
}

// ─── Property Tests: Ordering ───────────────────────────────────────────────

proptest! {
    /// Splitting a sequenced log into any partitions and merging gives it back.
    #[test]
    fn merge_restores_sequenced_log(
        (height, width, ops) in arb_drawing(),
        created_at in arb_time(),
        assignment in prop::collection::vec(0usize..3, 12),
    ) {
        let canvas = drawing(height, width, &ops, created_at);
        let mut partitions: Vec<Vec<PartitionEntry>> = vec![Vec::new(); 3];
        for (entry, slot) in canvas.entries().iter().rev().zip(assignment.iter()) {
            partitions[*slot].push(PartitionEntry {
                sequence: Some(entry.sequence),
                created_at: entry.task.created_at(),
                task: entry.task.clone(),
            });
        }
        prop_assert_eq!(merge_partitions(partitions), canvas.entries().to_vec());
    }

    /// The partitioned store returns the log in acceptance order.
    #[test]
    fn partitioned_store_round_trip((height, width, ops) in arb_drawing(), created_at in arb_time()) {
        let canvas = drawing(height, width, &ops, created_at);
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = PartitionedMemoryStore::new(InMemoryBackend::new());
            store.insert(&canvas).await.unwrap();
            store.update(&canvas).await.unwrap();
            let loaded = store.find_by_id(canvas.id()).await.unwrap();
            prop_assert_eq!(render(&loaded).unwrap(), render(&canvas).unwrap());
            prop_assert_eq!(&loaded, &canvas);
            Ok(())
        })?;
    }
}
