//! Iterative 4-connected flood fill.

use super::grid::Grid;

/// Replaces the 4-connected region of cells matching the seed's character
/// with `filler`.
///
/// Traversal uses an explicit stack, so depth does not grow with the area
/// of the region. A cell is overwritten before it is pushed; once written it
/// no longer matches the target, which is what stops it being visited twice.
/// A seed that already holds `filler` leaves the grid unchanged.
pub(crate) fn flood_fill(grid: &mut Grid, x: usize, y: usize, filler: char) {
    let Some(target) = grid.get(x, y) else {
        return;
    };
    if target == filler {
        return;
    }

    grid.set(x, y, filler);
    let mut stack = vec![(x, y)];
    while let Some((cx, cy)) = stack.pop() {
        for (nx, ny) in neighbours(cx, cy, grid.width(), grid.height()) {
            if grid.get(nx, ny) == Some(target) {
                grid.set(nx, ny, filler);
                stack.push((nx, ny));
            }
        }
    }
}

fn neighbours(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let right = (x + 1 < width).then(|| (x + 1, y));
    let left = x.checked_sub(1).map(|nx| (nx, y));
    let down = (y + 1 < height).then(|| (x, y + 1));
    let up = y.checked_sub(1).map(|ny| (x, ny));
    [right, left, down, up].into_iter().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(lines: &[&str]) -> Grid {
        let width = lines.first().map_or(0, |l| l.chars().count());
        let mut grid = Grid::blank(lines.len(), width);
        for (y, line) in lines.iter().enumerate() {
            for (x, c) in line.chars().enumerate() {
                grid.set(x, y, c);
            }
        }
        grid
    }

    #[test]
    fn fills_open_region_and_stops_at_borders() {
        let mut grid = grid_from(&["   #  ", "   #  ", "####  "]);
        flood_fill(&mut grid, 0, 0, '.');
        assert_eq!(grid.to_string(), "...#  \n...#  \n####  \n");
    }

    #[test]
    fn does_not_cross_diagonals() {
        let mut grid = grid_from(&[" #", "# "]);
        flood_fill(&mut grid, 0, 0, '*');
        assert_eq!(grid.to_string(), "*#\n# \n");
    }

    #[test]
    fn refilling_with_same_character_terminates() {
        let mut grid = grid_from(&["   ", "   "]);
        flood_fill(&mut grid, 1, 1, ' ');
        assert_eq!(grid, Grid::blank(2, 3));
    }

    #[test]
    fn large_region_does_not_overflow_the_stack() {
        let mut grid = Grid::blank(1000, 1000);
        flood_fill(&mut grid, 500, 500, 'x');
        assert!(grid.rows().all(|row| row.iter().all(|c| *c == 'x')));
    }

    #[test]
    fn seed_outside_grid_is_ignored() {
        let mut grid = Grid::blank(2, 2);
        flood_fill(&mut grid, 2, 0, 'x');
        assert_eq!(grid, Grid::blank(2, 2));
    }
}
