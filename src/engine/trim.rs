//! Sparsity trimming of an isolated table block.
//!
//! Columns are evaluated before rows on purpose: a row whose only content
//! sits in columns that are empty everywhere else must still be dropped once
//! those columns are gone. Remaining rows and columns keep their order.

use crate::grid::Grid;
use crate::grid::Value;

/// Emptiness policy used when trimming.
///
/// The dictionaries use 0 to mean "not applicable" rather than a real count,
/// so the permissive mode treats zero-valued cells as empty too.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrimMode {
    /// Only the true-empty marker counts as empty
    Strict,
    /// The scalar zero also counts as empty
    #[default]
    Permissive,
}

impl TrimMode {
    fn is_blank(&self, value: &Value) -> bool {
        match value {
            Value::Empty => true,
            Value::Number(number) => *self == TrimMode::Permissive && *number == 0.0,
            Value::Text(_) => false,
        }
    }
}

/// Removes every column that is blank in all rows, then every row that is
/// blank across the remaining columns. Produces a new grid; a grid with no
/// real content reduces to the 0x0 grid.
pub fn trim(grid: &Grid, mode: TrimMode) -> Grid {
    let kept_cols: Vec<usize> = (0..grid.cols())
        .filter(|&col| (0..grid.rows()).any(|row| !mode.is_blank(grid.at(row, col))))
        .collect();
    let kept_rows: Vec<usize> = (0..grid.rows())
        .filter(|&row| kept_cols.iter().any(|&col| !mode.is_blank(grid.at(row, col))))
        .collect();
    Grid::from_rows(
        kept_rows
            .iter()
            .map(|&row| kept_cols.iter().map(|&col| grid.at(row, col).clone()).collect())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse_grid() -> Grid {
        Grid::from_rows(vec![
            vec![Value::from(1.0), Value::Empty, Value::from(0.0), Value::Empty],
            vec![Value::from(2.0), Value::Empty, Value::from(0.0), Value::Empty],
            vec![Value::Empty, Value::Empty, Value::Empty, Value::Empty],
        ])
    }

    #[test]
    fn drops_empty_columns_and_rows() {
        let trimmed = trim(&sparse_grid(), TrimMode::Strict);
        assert_eq!(trimmed.rows(), 2);
        assert_eq!(trimmed.cols(), 2);
        assert_eq!(trimmed.value(1, 1).unwrap(), &Value::from(0.0));
    }

    #[test]
    fn permissive_mode_counts_zero_as_empty() {
        let trimmed = trim(&sparse_grid(), TrimMode::Permissive);
        assert_eq!(trimmed.rows(), 2);
        assert_eq!(trimmed.cols(), 1);
        assert_eq!(trimmed.value(1, 0).unwrap(), &Value::from(2.0));
    }

    #[test]
    fn all_empty_and_zero_grid_reduces_to_nothing() {
        let grid = Grid::from_rows(vec![
            vec![Value::Empty, Value::from(0.0)],
            vec![Value::from(0.0), Value::Empty],
        ]);
        let trimmed = trim(&grid, TrimMode::Permissive);
        assert_eq!(trimmed.rows(), 0);
        assert_eq!(trimmed.cols(), 0);
    }

    #[test]
    fn columns_are_evaluated_before_rows() {
        // Row 1's only content is a zero sitting in an otherwise-zero
        // column; once that column goes, the row must go too.
        let grid = Grid::from_rows(vec![
            vec![Value::from("a"), Value::from(0.0)],
            vec![Value::Empty, Value::from(0.0)],
        ]);
        let trimmed = trim(&grid, TrimMode::Permissive);
        assert_eq!(trimmed.rows(), 1);
        assert_eq!(trimmed.cols(), 1);
        assert_eq!(trimmed.value(0, 0).unwrap(), &Value::from("a"));
    }

    #[test]
    fn trim_is_idempotent() {
        for mode in [TrimMode::Strict, TrimMode::Permissive] {
            let once = trim(&sparse_grid(), mode);
            let twice = trim(&once, mode);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn trim_preserves_order() {
        let grid = Grid::from_rows(vec![
            vec![Value::from("b"), Value::Empty, Value::from("a")],
            vec![Value::from("d"), Value::Empty, Value::from("c")],
        ]);
        let trimmed = trim(&grid, TrimMode::Strict);
        assert_eq!(trimmed.value(0, 0).unwrap(), &Value::from("b"));
        assert_eq!(trimmed.value(0, 1).unwrap(), &Value::from("a"));
        assert_eq!(trimmed.value(1, 1).unwrap(), &Value::from("c"));
    }
}
