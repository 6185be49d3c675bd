//! The character grid produced by rendering.

use std::fmt;

/// Character every cell holds before any task is replayed.
pub const BLANK: char = ' ';

/// A `height` x `width` matrix of characters, stored row by row.
///
/// `Display` writes each row followed by a newline, which is the plain-text
/// form served to clients.
///
/// # Examples
///
/// ```
/// use sketch::render::Grid;
///
/// let grid = Grid::blank(2, 3);
/// assert_eq!(grid.to_string(), "   \n   \n");
/// assert_eq!(grid.row(1), Some(&[' ', ' ', ' '][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl Grid {
    /// Allocates a grid with every cell set to [`BLANK`].
    pub fn blank(height: usize, width: usize) -> Self {
        Self {
            rows: vec![vec![BLANK; width]; height],
            width,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Character at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Overwrites the cell at column `x`, row `y`. Out-of-range writes are
    /// ignored; callers validate geometry before painting.
    pub(crate) fn set(&mut self, x: usize, y: usize, value: char) {
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = value;
        }
    }

    /// Row `y`, left to right.
    pub fn row(&self, y: usize) -> Option<&[char]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Rows as strings, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| row.iter().collect())
    }

    /// Consumes the grid, returning its rows.
    pub fn into_rows(self) -> Vec<Vec<char>> {
        self.rows
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_grid_dimensions() {
        let grid = Grid::blank(3, 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 4);
        assert!(grid.rows().all(|row| row.iter().all(|c| *c == BLANK)));
    }

    #[test]
    fn out_of_range_access() {
        let mut grid = Grid::blank(2, 2);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 2), None);
        grid.set(5, 5, 'x');
        assert_eq!(grid, Grid::blank(2, 2));
    }

    #[test]
    fn zero_width_rows_still_print() {
        let grid = Grid::blank(2, 0);
        assert_eq!(grid.to_string(), "\n\n");
    }
}
