//! Column-span detection along a header row.
//!
//! A table's true width is never the sheet's nominal width — trailing
//! columns are reused by unrelated sections. The width comes from the header
//! row instead: header cells share the column prefix convention, and the
//! span ends at the first cell that breaks it.

use crate::engine::scan::is_column_header;
use crate::grid::Grid;
use crate::grid::GridError;

/// Walks rightward from `start_col` along `header_row` while cells keep the
/// column-header prefix, and returns the last matching column index.
///
/// Returns `None` when the starting cell itself does not match. The walk
/// runs against the original, unclipped grid so that the returned index is
/// an absolute column coordinate usable for extraction.
pub fn last_header_column(
    grid: &Grid,
    header_row: usize,
    start_col: usize,
) -> Result<Option<usize>, GridError> {
    if header_row >= grid.rows() || start_col >= grid.cols() {
        return Err(GridError::OutOfBounds {
            row: header_row,
            col: start_col,
            rows: grid.rows(),
            cols: grid.cols(),
        });
    }
    let mut last = None;
    for col in start_col..grid.cols() {
        if is_column_header(grid.at(header_row, col)) {
            last = Some(col);
        } else {
            break;
        }
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Value;

    fn header_grid() -> Grid {
        // Header row at index 5, COL1..COL3 at columns 2..=4, TOTAL at 5.
        let mut rows = vec![vec![]; 5];
        rows.push(vec![
            Value::Empty,
            Value::Empty,
            Value::from("COL1"),
            Value::from("COL2"),
            Value::from("COL3"),
            Value::from("TOTAL"),
        ]);
        Grid::from_rows(rows)
    }

    #[test]
    fn span_stops_before_the_first_non_header() {
        let grid = header_grid();
        assert_eq!(last_header_column(&grid, 5, 2).unwrap(), Some(4));
    }

    #[test]
    fn span_reaches_the_right_edge() {
        let grid = Grid::from_rows(vec![vec![Value::from("COL1"), Value::from("COL2")]]);
        assert_eq!(last_header_column(&grid, 0, 0).unwrap(), Some(1));
    }

    #[test]
    fn non_matching_start_yields_none() {
        let grid = header_grid();
        assert_eq!(last_header_column(&grid, 5, 1).unwrap(), None);
    }

    #[test]
    fn out_of_range_start_is_an_error() {
        let grid = header_grid();
        assert!(matches!(
            last_header_column(&grid, 9, 0),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(matches!(
            last_header_column(&grid, 5, 6),
            Err(GridError::OutOfBounds { .. })
        ));
    }
}
