//! Rendering scenarios on known drawings.
//!
//! Every expected grid is padded to the full canvas width, one line per row.

use chrono::Utc;
use pretty_assertions::assert_eq;
use sketch::domain::{Canvas, Fill, LogEntry, Point, Rectangle, Task, UnrecognizedTask};
use sketch::render::{render, AsciiRenderer, Renderer};
use sketch::{BoundsViolation, SketchError};
use uuid::Uuid;

fn rectangle(x: u32, y: u32, height: u32, width: u32, filler: char, outline: char) -> Rectangle {
    Rectangle::new(Uuid::new_v4(), Point::new(x, y), height, width, filler, outline, Utc::now())
}

fn fill(x: u32, y: u32, filler: char) -> Fill {
    Fill::new(Uuid::new_v4(), Point::new(x, y), filler, Utc::now())
}

fn two_rectangles() -> Canvas {
    let mut canvas = Canvas::new(Uuid::new_v4(), 9, 24, Utc::now());
    canvas.add_rectangle(rectangle(3, 2, 3, 5, 'X', '@')).unwrap();
    canvas.add_rectangle(rectangle(10, 3, 6, 14, '0', 'X')).unwrap();
    canvas
}

fn three_rectangles() -> Canvas {
    let mut canvas = Canvas::new(Uuid::new_v4(), 8, 21, Utc::now());
    canvas.add_rectangle(rectangle(14, 0, 6, 7, '.', '.')).unwrap();
    canvas.add_rectangle(rectangle(0, 3, 4, 8, ' ', 'O')).unwrap();
    canvas.add_rectangle(rectangle(5, 5, 3, 5, 'X', 'X')).unwrap();
    canvas
}

// ─── Fixtures ───────────────────────────────────────────────────────────────

mod fixture_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn two_rectangles_on_9x24() {
        let grid = render(&two_rectangles()).unwrap();
        assert_eq!(
            grid.to_string(),
            concat!(
                "                        \n",
                "                        \n",
                "   @@@@@                \n",
                "   @XXX@  XXXXXXXXXXXXXX\n",
                "   @@@@@  X000000000000X\n",
                "          X000000000000X\n",
                "          X000000000000X\n",
                "          X000000000000X\n",
                "          XXXXXXXXXXXXXX\n",
            )
        );
    }

    #[test]
    fn three_rectangles_on_8x21() {
        let grid = render(&three_rectangles()).unwrap();
        assert_eq!(
            grid.to_string(),
            concat!(
                "              .......\n",
                "              .......\n",
                "              .......\n",
                "OOOOOOOO      .......\n",
                "O      O      .......\n",
                "O    XXXXX    .......\n",
                "OOOOOXXXXX           \n",
                "     XXXXX           \n",
            )
        );
    }

    #[test]
    fn three_rectangles_then_fill_from_origin() {
        let mut canvas = three_rectangles();
        canvas.add_fill(fill(0, 0, '-')).unwrap();

        let grid = render(&canvas).unwrap();
        assert_eq!(
            grid.to_string(),
            concat!(
                "--------------.......\n",
                "--------------.......\n",
                "--------------.......\n",
                "OOOOOOOO------.......\n",
                "O      O------.......\n",
                "O    XXXXX----.......\n",
                "OOOOOXXXXX-----------\n",
                "     XXXXX-----------\n",
            )
        );
    }

    #[test]
    fn grid_shape_matches_canvas() {
        let grid = render(&two_rectangles()).unwrap();
        assert_eq!((grid.height(), grid.width()), (9, 24));
        assert!(grid.lines().all(|line| line.chars().count() == 24));
    }
}

// ─── Scenarios ──────────────────────────────────────────────────────────────

mod scenario_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_rectangle_at_origin() {
        let mut canvas = Canvas::new(Uuid::new_v4(), 4, 6, Utc::now());
        canvas.add_rectangle(rectangle(0, 0, 3, 4, '*', '#')).unwrap();
        assert_eq!(
            render(&canvas).unwrap().to_string(),
            "####  \n#**#  \n####  \n      \n"
        );
    }

    #[test]
    fn rejected_rectangle_leaves_log_and_render_unchanged() {
        let mut canvas = three_rectangles();
        let before = render(&canvas).unwrap();

        let result = canvas.add_rectangle(rectangle(15, 0, 1, 7, 'z', 'z'));
        assert!(matches!(
            result,
            Err(SketchError::OutOfBounds(BoundsViolation::RectangleWidth { .. }))
        ));
        assert_eq!(canvas.entries().len(), 3);
        assert_eq!(render(&canvas).unwrap(), before);
    }

    #[test]
    fn unrecognized_task_fails_the_whole_render() {
        let mut log: Vec<LogEntry> = three_rectangles().entries().to_vec();
        let id = Uuid::new_v4();
        log.push(LogEntry::new(
            4,
            Task::Unrecognized(UnrecognizedTask {
                id: Some(id),
                kind: "triangle".to_string(),
            }),
        ));
        let canvas = Canvas::from_log(Uuid::new_v4(), 8, 21, log, Utc::now());

        match render(&canvas) {
            Err(SketchError::InvalidTask { task_id, kind }) => {
                assert_eq!(task_id, Some(id));
                assert_eq!(kind, "triangle");
            },
            other => panic!("expected InvalidTask, got {other:?}"),
        }
    }

    #[test]
    fn fill_enclosed_region_only() {
        let mut canvas = Canvas::new(Uuid::new_v4(), 5, 5, Utc::now());
        canvas.add_rectangle(rectangle(0, 0, 5, 5, ' ', '#')).unwrap();
        canvas.add_fill(fill(2, 2, 'o')).unwrap();
        assert_eq!(
            render(&canvas).unwrap().to_string(),
            "#####\n#ooo#\n#ooo#\n#ooo#\n#####\n"
        );
    }

    #[test]
    fn zero_height_canvas_is_degenerate() {
        let canvas = Canvas::new(Uuid::new_v4(), 0, 10, Utc::now());
        assert!(matches!(
            render(&canvas),
            Err(SketchError::OutOfBounds(BoundsViolation::DegenerateCanvas))
        ));
    }
}

// ─── Determinism ────────────────────────────────────────────────────────────

mod determinism_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repeated_renders_are_identical() {
        let mut canvas = three_rectangles();
        canvas.add_fill(fill(0, 0, '-')).unwrap();

        let first = AsciiRenderer.render(&canvas).unwrap();
        for _ in 0..10 {
            assert_eq!(AsciiRenderer.render(&canvas).unwrap(), first);
        }
    }

    #[test]
    fn render_does_not_mutate_the_canvas() {
        let canvas = two_rectangles();
        let before = canvas.clone();
        render(&canvas).unwrap();
        assert_eq!(canvas, before);
    }

    #[test]
    fn order_of_overlapping_tasks_matters() {
        let mut first = Canvas::new(Uuid::new_v4(), 3, 3, Utc::now());
        first.add_rectangle(rectangle(0, 0, 3, 3, 'a', 'a')).unwrap();
        first.add_rectangle(rectangle(1, 1, 2, 2, 'b', 'b')).unwrap();

        let mut second = Canvas::new(Uuid::new_v4(), 3, 3, Utc::now());
        second.add_rectangle(rectangle(1, 1, 2, 2, 'b', 'b')).unwrap();
        second.add_rectangle(rectangle(0, 0, 3, 3, 'a', 'a')).unwrap();

        assert_eq!(render(&first).unwrap().to_string(), "aaa\nabb\nabb\n");
        assert_eq!(render(&second).unwrap().to_string(), "aaa\naaa\naaa\n");
    }
}
