//! Fixed-size grid storage shared by every game.
//!
//! A [`Board`] owns its cells in row-major order and never changes shape
//! after creation. It knows nothing about rules; callers validate moves
//! before writing through [`Board::set`] or [`Board::with`].

use derive_more::Display;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Board dimensions in rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, new)]
#[display("{}x{}", rows, cols)]
pub struct Dimensions {
    rows: usize,
    cols: usize,
}

impl Dimensions {
    /// Square dimensions (`size x size`).
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns true if the coordinate lies on a board of these dimensions.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Converts a coordinate to its row-major index, if in bounds.
    pub fn index_of(&self, coord: Coord) -> Option<usize> {
        self.contains(coord).then(|| coord.row * self.cols + coord.col)
    }

    /// Converts a row-major index back to a coordinate, if in bounds.
    pub fn coord_of(&self, index: usize) -> Option<Coord> {
        (index < self.cell_count()).then(|| Coord::new(index / self.cols, index % self.cols))
    }
}

/// A cell position: zero-based row (top to bottom) and column (left to right).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, new,
)]
#[display("({}, {})", row, col)]
pub struct Coord {
    /// Row index, 0 is the top row.
    pub row: usize,
    /// Column index, 0 is the leftmost column.
    pub col: usize,
}

impl Coord {
    /// Offsets this coordinate by a signed delta, returning `None` below zero.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Coord> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Some(Coord::new(row, col))
    }
}

/// Error raised by bounds-checked board access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BoardError {
    /// The coordinate lies outside the board.
    #[display("Position {} is out of bounds for a {} board", coord, dimensions)]
    OutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// The board's dimensions.
        dimensions: Dimensions,
    },
}

impl std::error::Error for BoardError {}

/// Renders a single cell as one character.
pub trait CellGlyph {
    /// Character used when printing the board.
    fn glyph(&self) -> char;
}

/// A fixed-size grid of cells stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board<C> {
    dimensions: Dimensions,
    cells: Vec<C>,
}

impl<C: Copy + Default> Board<C> {
    /// Creates a board with every cell set to `C::default()` (empty).
    #[instrument]
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            cells: vec![C::default(); dimensions.cell_count()],
        }
    }

    /// Returns the board's dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Returns true if the coordinate lies on this board.
    pub fn contains(&self, coord: Coord) -> bool {
        self.dimensions.contains(coord)
    }

    /// Reads the cell at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if `coord` is off the board.
    pub fn get(&self, coord: Coord) -> Result<C, BoardError> {
        let index = self.index(coord)?;
        Ok(self.cells[index])
    }

    /// Writes the cell at `coord` in place.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if `coord` is off the board.
    pub fn set(&mut self, coord: Coord, value: C) -> Result<(), BoardError> {
        let index = self.index(coord)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns a copy of this board with one cell replaced.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] if `coord` is off the board.
    pub fn with(&self, coord: Coord, value: C) -> Result<Self, BoardError> {
        let mut next = self.clone();
        next.set(coord, value)?;
        Ok(next)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[C] {
        &self.cells
    }

    /// Iterates every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let dims = self.dimensions;
        (0..dims.rows()).flat_map(move |row| (0..dims.cols()).map(move |col| Coord::new(row, col)))
    }

    /// Iterates `(coord, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, C)> + '_ {
        self.coords().zip(self.cells.iter().copied())
    }

    fn index(&self, coord: Coord) -> Result<usize, BoardError> {
        self.dimensions.index_of(coord).ok_or(BoardError::OutOfBounds {
            coord,
            dimensions: self.dimensions,
        })
    }
}

impl<C: Copy + Default + CellGlyph> std::fmt::Display for Board<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.dimensions.rows() {
            let start = row * self.dimensions.cols();
            let line: Vec<String> = self.cells[start..start + self.dimensions.cols()]
                .iter()
                .map(|cell| cell.glyph().to_string())
                .collect();
            write!(f, "{}", line.join("|"))?;
            if row + 1 < self.dimensions.rows() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
