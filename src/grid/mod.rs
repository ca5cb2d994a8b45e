//! # Cell Grid
//!
//! A rectangular, bounds-checked view over one sheet's cell values. The grid
//! is immutable from the engine's perspective: extraction and trimming always
//! produce a new grid, and row/column counts are fixed for a grid's lifetime.

use thiserror::Error;

pub(crate) mod value;

pub use value::Value;

/// Errors raised by grid coordinate and region validation.
#[derive(Error, Debug, PartialEq)]
pub enum GridError {
    /// A coordinate lies outside the grid's nominal shape
    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds { row: usize, col: usize, rows: usize, cols: usize },

    /// A region end coordinate exceeds the grid's nominal shape
    #[error("Region ({region}) exceeds the {rows}x{cols} grid")]
    RegionOutOfBounds { region: Region, rows: usize, cols: usize },

    /// A region start coordinate is past its end coordinate
    #[error("Region start {start} is past end {end} on the {axis} axis")]
    RegionInverted { axis: &'static str, start: usize, end: usize },
}

/// A rectangle within a grid, inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Region {
    /// Creates a region, rejecting inverted spans on either axis.
    ///
    /// Upper bounds are validated against a concrete grid by
    /// [`Grid::region`]; an inverted span is a construction error here so
    /// that callers can distinguish the two failure causes.
    pub fn new(
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Result<Region, GridError> {
        if end_row < start_row {
            return Err(GridError::RegionInverted {
                axis: "row",
                start: start_row,
                end: end_row,
            });
        }
        if end_col < start_col {
            return Err(GridError::RegionInverted {
                axis: "column",
                start: start_col,
                end: end_col,
            });
        }
        Ok(Region {
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }

    /// Number of rows covered by the region.
    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Number of columns covered by the region.
    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows {}..={}, cols {}..={}",
            self.start_row, self.end_row, self.start_col, self.end_col
        )
    }
}

static EMPTY: Value = Value::Empty;

/// A rectangular array of cell values addressed by zero-based (row, column).
///
/// Source rows may be ragged; the grid reports the rectangular bounding shape
/// and reads unfilled positions as [`Value::Empty`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Value>>,
}

impl Grid {
    /// Builds a grid from row vectors. The column count is the widest row.
    pub fn from_rows(cells: Vec<Vec<Value>>) -> Grid {
        let rows = cells.len();
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        Grid { rows, cols, cells }
    }

    /// Number of rows in the nominal shape.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns in the nominal shape.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true when the grid holds no cells at all.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Returns the value at (row, col).
    ///
    /// Positions inside the nominal shape with no stored entry read as
    /// [`Value::Empty`]; positions outside the shape are an error.
    pub fn value(&self, row: usize, col: usize) -> Result<&Value, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.at(row, col))
    }

    /// Unchecked companion of [`Grid::value`] for loop-bounded internal use.
    pub(crate) fn at(&self, row: usize, col: usize) -> &Value {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Extracts a region as a new grid reindexed from (0, 0).
    ///
    /// The region must fit inside the nominal shape; there is no clamping.
    pub fn region(&self, region: Region) -> Result<Grid, GridError> {
        if region.end_row >= self.rows || region.end_col >= self.cols {
            return Err(GridError::RegionOutOfBounds {
                region,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let cells = (region.start_row..=region.end_row)
            .map(|row| {
                (region.start_col..=region.end_col)
                    .map(|col| self.at(row, col).clone())
                    .collect()
            })
            .collect();
        Ok(Grid {
            rows: region.height(),
            cols: region.width(),
            cells,
        })
    }
}
