//! Grid types: row-major cell bytes, coordinates and flip diffs.

use std::ops::Range;

use crate::error::ImageError;

pub const ALIVE: u8 = 0xFF;                       // Live cell byte
pub const DEAD: u8 = 0x00;                        // Dead cell byte

pub type TRow = Vec<u8>;

/// A cell coordinate: `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Row-major toroidal grid of one-byte cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// An all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![DEAD; width * height] }
    }

    /// Builds a grid from `width * height` row-major bytes, each `0x00` or `0xFF`.
    pub fn from_bytes(width: usize, height: usize, bytes: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width * height;
        if bytes.len() != expected {
            return Err(ImageError::Truncated { expected, actual: bytes.len() });
        }
        if let Some(offset) = bytes.iter().position(|&b| b != ALIVE && b != DEAD) {
            return Err(ImageError::BadPixel { offset, value: bytes[offset] });
        }
        Ok(Self { width, height, cells: bytes })
    }

    /// Builds a grid from assembled band rows. Rows must all be `width` long.
    pub fn from_rows(width: usize, rows: Vec<TRow>) -> Option<Self> {
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width { return None; }
            cells.extend_from_slice(&row);
        }
        Some(Self { width, height, cells })
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn as_bytes(&self) -> &[u8] { &self.cells }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Copies a range of rows out by value.
    pub fn rows(&self, range: Range<usize>) -> Vec<TRow> {
        range.map(|y| self.row(y).to_vec()).collect()
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.cells[y * self.width + x] = value;
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == ALIVE
    }

    pub fn toggle(&mut self, x: usize, y: usize) {
        let flipped = if self.is_alive(x, y) { DEAD } else { ALIVE };
        self.set(x, y, flipped);
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|&&b| b == ALIVE).count()
    }

    /// Every live cell in row-major order.
    pub fn alive_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == ALIVE)
            .map(|(i, _)| Cell::new(i % self.width, i / self.width))
            .collect()
    }

    /// Cells whose state differs between `self` and `next`, row-major.
    /// Both grids must share dimensions.
    pub fn flipped(&self, next: &Grid) -> Vec<Cell> {
        debug_assert_eq!((self.width, self.height), (next.width, next.height));
        self.cells
            .iter()
            .zip(&next.cells)
            .enumerate()
            .filter(|&(_, (a, b))| a != b)
            .map(|(i, _)| Cell::new(i % self.width, i / self.width))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_binary_pixels() {
        let err = Grid::from_bytes(2, 1, vec![ALIVE, 0x7F]).unwrap_err();
        assert!(matches!(err, ImageError::BadPixel { offset: 1, value: 0x7F }));
    }

    #[test]
    fn rejects_short_buffers() {
        let err = Grid::from_bytes(2, 2, vec![DEAD; 3]).unwrap_err();
        assert!(matches!(err, ImageError::Truncated { expected: 4, actual: 3 }));
    }

    #[test]
    fn alive_cells_are_row_major() {
        let mut grid = Grid::new(3, 3);
        grid.set(2, 0, ALIVE);
        grid.set(0, 2, ALIVE);
        grid.set(1, 1, ALIVE);
        assert_eq!(grid.alive_cells(), vec![Cell::new(2, 0), Cell::new(1, 1), Cell::new(0, 2)]);
        assert_eq!(grid.alive_count(), 3);
    }

    #[test]
    fn flipped_lists_only_changed_cells() {
        let before = Grid::new(4, 2);
        let mut after = before.clone();
        after.set(3, 1, ALIVE);
        after.toggle(0, 0);
        assert_eq!(before.flipped(&after), vec![Cell::new(0, 0), Cell::new(3, 1)]);
        assert!(before.flipped(&before).is_empty());
    }

    #[test]
    fn rows_round_back_into_a_grid() {
        let mut grid = Grid::new(3, 4);
        grid.set(1, 2, ALIVE);
        let rebuilt = Grid::from_rows(3, grid.rows(0..4)).unwrap();
        assert_eq!(rebuilt, grid);
        assert!(Grid::from_rows(2, grid.rows(0..1)).is_none());
    }
}
